// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curtain wall extraction
//!
//! Builds a [`CurtainGridModel`] from a host wall's grid snapshot. Cells and
//! panels are walked in lockstep by position, and each panel records that
//! position in its identity. Interior mullions are found by geometric
//! coincidence with a grid line; every other mullion is a perimeter mullion.

use crate::context::ExtractionContext;
use crate::correlation::PanelIdentity;
use crate::error::{Error, Result};
use crate::schema::{
    CurtainGridModel, GridLine, Material, Mullion, MullionPlacement, Panel, PanelKind,
};
use bim_bridge_core::{
    HostCell, HostCurtainGrid, HostCurve, HostGridLine, HostId, HostMullion, HostPanel, HostWall,
};
use bim_bridge_geometry::{Curve, Polygon, Transform};
use rustc_hash::FxHashSet;
use uuid::Uuid;

/// Whether both endpoints of `mullion_curve` lie within `tolerance` of
/// `grid_curve`, all in host units
pub fn is_attached(mullion_curve: &HostCurve, grid_curve: &HostCurve, tolerance: f64) -> bool {
    grid_curve.distance_to(&mullion_curve.end_point(0)) < tolerance
        && grid_curve.distance_to(&mullion_curve.end_point(1)) < tolerance
}

impl ExtractionContext<'_> {
    pub fn extract_curtain_wall(&self, wall: &HostWall) -> Result<CurtainGridModel> {
        let grid = wall.curtain_grid.as_ref().ok_or_else(|| {
            Error::UnsupportedTopology(format!("wall {} has no curtain grid", wall.id))
        })?;

        let profile = self.sorter.sort_host_loops(&wall.profile_loops)?;

        let u_grid_lines = grid.u_lines.iter().map(|l| self.grid_line(l)).collect();
        let v_grid_lines = grid.v_lines.iter().map(|l| self.grid_line(l)).collect();

        let (interior, perimeter) = self.classify_mullions(grid);
        let interior_mullions = self.mullions(&interior, MullionPlacement::Interior);
        let perimeter_mullions = self.mullions(&perimeter, MullionPlacement::Perimeter);

        let panels = self.panels(grid);

        tracing::debug!(
            wall = %wall.id,
            u_lines = grid.u_lines.len(),
            v_lines = grid.v_lines.len(),
            interior_mullions = interior_mullions.len(),
            perimeter_mullions = perimeter_mullions.len(),
            panels = panels.len(),
            "Extracted curtain wall"
        );

        Ok(CurtainGridModel {
            id: Uuid::new_v4(),
            name: wall.name.clone(),
            profile,
            u_grid_lines,
            v_grid_lines,
            interior_mullions,
            perimeter_mullions,
            panels,
        })
    }

    fn grid_line(&self, line: &HostGridLine) -> GridLine {
        let lod = self.curve_level_of_detail();
        GridLine {
            family: line.family,
            full_curve: Curve::from_host(&line.full_curve, lod),
            segments: line.segments.iter().map(|c| Curve::from_host(c, lod)).collect(),
            skipped_segments: line
                .skipped_segments
                .iter()
                .map(|c| Curve::from_host(c, lod))
                .collect(),
        }
    }

    /// Split mullions into (interior, perimeter), interior in grid line order
    fn classify_mullions<'g>(
        &self,
        grid: &'g HostCurtainGrid,
    ) -> (Vec<&'g HostMullion>, Vec<&'g HostMullion>) {
        let tolerance = self.config.mullion_coincidence_tolerance;
        let mut interior_ids: FxHashSet<HostId> = FxHashSet::default();
        let mut interior = Vec::new();

        for line in grid.grid_lines() {
            for mullion in &grid.mullions {
                let Some(curve) = &mullion.location_curve else {
                    continue;
                };
                if is_attached(curve, &line.full_curve, tolerance) && interior_ids.insert(mullion.id) {
                    interior.push(mullion);
                }
            }
        }

        let perimeter = grid
            .mullions
            .iter()
            .filter(|m| !interior_ids.contains(&m.id))
            .collect();
        (interior, perimeter)
    }

    fn mullions(&self, hosts: &[&HostMullion], placement: MullionPlacement) -> Vec<Mullion> {
        hosts
            .iter()
            .filter_map(|host| match self.mullion(host, placement) {
                Ok(mullion) => Some(mullion),
                Err(err) => {
                    tracing::warn!(mullion = %host.id, error = %err, "Skipping mullion");
                    None
                }
            })
            .collect()
    }

    fn mullion(&self, host: &HostMullion, placement: MullionPlacement) -> Result<Mullion> {
        let location = host.location_curve.as_ref().ok_or_else(|| {
            bim_bridge_geometry::Error::unavailable(format!("location curve of mullion {}", host.id))
        })?;
        let resolved = self.resolver.resolve(host);

        let mut transform = Transform::from_host(&host.transform);
        if placement == MullionPlacement::Perimeter && resolved.centerline_offset > 0.0 {
            transform = transform.moved(-transform.x_axis() * resolved.centerline_offset);
        }

        Ok(Mullion {
            id: Uuid::new_v4(),
            centerline: Curve::from_host(location, self.curve_level_of_detail()),
            profile: resolved.profile,
            material: Material::aluminum(),
            transform: Some(transform),
            centerline_offset: resolved.centerline_offset,
            placement,
        })
    }

    fn panels(&self, grid: &HostCurtainGrid) -> Vec<Panel> {
        if grid.cells.len() != grid.panels.len() {
            tracing::warn!(
                cells = grid.cells.len(),
                panels = grid.panels.len(),
                "Cell and panel lists are not index aligned, unpaired entries are dropped"
            );
        }

        grid.cells
            .iter()
            .zip(grid.panels.iter())
            .enumerate()
            .filter_map(|(index, (cell, host))| match self.panel(index, cell, host) {
                Ok(panel) => Some(panel),
                Err(err) => {
                    tracing::warn!(panel = %host.id, index, error = %err, "Skipping panel");
                    None
                }
            })
            .collect()
    }

    fn panel(&self, index: usize, cell: &HostCell, host: &HostPanel) -> Result<Panel> {
        let (material, kind) = match &host.material {
            Some(material) => (
                Material::from_host(material),
                PanelKind::from_transparency(material.transparency),
            ),
            None => (Material::glass(), PanelKind::Glazed),
        };

        let first = cell
            .planarized_loops
            .first()
            .ok_or_else(|| bim_bridge_geometry::Error::unavailable("planarized cell loop"))?;
        let boundary = Polygon::new(first.iter().map(|c| c.end_point(0).to_meters()).collect())?;

        Ok(Panel {
            id: Uuid::new_v4(),
            name: format!("panel-{}", index),
            boundary,
            material,
            identity: PanelIdentity::new(index, host.type_name.as_str()).with_kind(kind),
        })
    }
}
