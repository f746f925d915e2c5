// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host reconstruction of schema elements
//!
//! A curtain wall is rebuilt in six phases, each separated by a recompute
//! barrier wherever the next phase reads derived host geometry:
//!
//! 1. Define the boundary wall from the profile perimeter.
//! 2. Orient it to match the profile normal.
//! 3. Add one grid line per schema grid line.
//! 4. Remove the skipped segments.
//! 5. Add a mullion on every remaining segment.
//! 6. Assign panel types by ordinal index.
//!
//! A model without grid lines has nothing to rebuild a grid from and is
//! emitted as independent direct shapes instead.

use crate::config::ConversionConfig;
use crate::correlation::PanelCorrelationIndex;
use crate::error::{Error, Result};
use crate::schema::{CurtainGridModel, SchemaElement};
use bim_bridge_core::{
    CommandQueue, DirectShapeCategory, GridFamily, HostCommand, HostCurve, HostDocument, HostId,
    TypeCategory, Ticket, Xyz,
};
use bim_bridge_geometry::{extrude_polygon, Mesh};

/// Elevation slack when matching the boundary base to a level, feet
const LEVEL_TOLERANCE: f64 = 1e-6;

/// Counts of what one curtain wall reconstruction did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionReport {
    pub wall: HostId,
    pub flipped: bool,
    pub grid_lines_added: usize,
    pub grid_lines_rejected: usize,
    pub segments_removed: usize,
    pub segments_rejected: usize,
    pub mullions_added: usize,
    pub mullions_rejected: usize,
    pub panels_typed: usize,
    /// Host panels left at their default type
    pub panels_untyped: usize,
}

impl ReconstructionReport {
    fn new(wall: HostId) -> Self {
        Self {
            wall,
            flipped: false,
            grid_lines_added: 0,
            grid_lines_rejected: 0,
            segments_removed: 0,
            segments_rejected: 0,
            mullions_added: 0,
            mullions_rejected: 0,
            panels_typed: 0,
            panels_untyped: 0,
        }
    }
}

/// What a schema element became in the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconstructed {
    CurtainWall(ReconstructionReport),
    /// Curtain wall without grid topology, one shape per panel and mullion
    DirectShapes(Vec<HostId>),
    Beam(HostId),
    Roof(HostId),
    /// Mesh elements have no host counterpart
    VisualizationOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementReconstructor<'c> {
    pub(crate) config: &'c ConversionConfig,
}

impl<'c> ElementReconstructor<'c> {
    pub fn new(config: &'c ConversionConfig) -> Self {
        Self { config }
    }

    /// Rebuild one element. Every mutation goes through a fresh
    /// [`CommandQueue`] bound to `document`.
    pub fn reconstruct<D: HostDocument + ?Sized>(
        &self,
        document: &mut D,
        element: &SchemaElement,
    ) -> Result<Reconstructed> {
        let mut queue = CommandQueue::new(document);
        match element {
            SchemaElement::Beam(beam) => self.place_beam(&mut queue, beam).map(Reconstructed::Beam),
            SchemaElement::Roof(roof) => self.place_roof(&mut queue, roof).map(Reconstructed::Roof),
            SchemaElement::CurtainWall(model) => match self.reconstruct_curtain_wall(&mut queue, model) {
                Ok(report) => Ok(Reconstructed::CurtainWall(report)),
                Err(Error::UnsupportedTopology(reason)) => {
                    tracing::info!(wall = %model.name, reason = %reason, "Rebuilding curtain wall as direct shapes");
                    self.place_direct_shapes(&mut queue, model)
                        .map(Reconstructed::DirectShapes)
                }
                Err(err) => Err(err),
            },
            SchemaElement::Mesh(_) => Ok(Reconstructed::VisualizationOnly),
        }
    }

    /// Grid based reconstruction. Fails with [`Error::UnsupportedTopology`]
    /// when the model has neither grid lines nor panels.
    pub fn reconstruct_curtain_wall<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        model: &CurtainGridModel,
    ) -> Result<ReconstructionReport> {
        if !model.has_grid_topology() {
            return Err(Error::UnsupportedTopology(format!(
                "curtain wall {} has no grid lines or panels",
                model.name
            )));
        }

        let wall = self.define_boundary(queue, model)?;
        let mut report = ReconstructionReport::new(wall);
        report.flipped = self.orient(queue, wall, model)?;
        self.add_grid_lines(queue, wall, model, &mut report)?;
        self.remove_skipped_segments(queue, wall, model, &mut report)?;
        self.add_mullions(queue, wall, &mut report)?;
        self.assign_panel_types(queue, wall, model, &mut report)?;

        tracing::info!(
            wall = %wall,
            grid_lines = report.grid_lines_added,
            mullions = report.mullions_added,
            panels_typed = report.panels_typed,
            panels_untyped = report.panels_untyped,
            barriers = queue.barriers(),
            "Reconstructed curtain wall"
        );
        Ok(report)
    }

    fn define_boundary<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        model: &CurtainGridModel,
    ) -> Result<HostId> {
        let perimeter = model.profile.perimeter();
        let boundary: Vec<HostCurve> = perimeter
            .segments()
            .map(|(a, b)| HostCurve::line(Xyz::from_meters(&a), Xyz::from_meters(&b)))
            .collect();

        let (min_z, max_z) = perimeter
            .vertices()
            .iter()
            .map(|p| Xyz::from_meters(p).z)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)));

        let levels = queue.document().levels();
        let base_level = levels
            .iter()
            .filter(|level| level.elevation <= min_z + LEVEL_TOLERANCE)
            .max_by(|a, b| a.elevation.total_cmp(&b.elevation))
            .or_else(|| levels.first())
            .map(|level| level.id)
            .ok_or_else(|| Error::skipped(&model.name, "document has no levels"))?;
        let wall_type = self.type_named(
            queue.document(),
            TypeCategory::CurtainWall,
            self.config.curtain_wall_type.as_deref(),
        );

        let ticket = queue.push(HostCommand::CreateCurtainWall {
            boundary,
            base_level,
            height: max_z - min_z,
            wall_type,
        });
        queue
            .flush()?
            .result(ticket)?
            .created_id()
            .ok_or_else(|| Error::skipped(&model.name, "host created no wall"))
    }

    /// Flip the wall when its facing opposes the profile normal
    fn orient<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        wall: HostId,
        model: &CurtainGridModel,
    ) -> Result<bool> {
        let Some(facing) = queue.derived()?.wall_orientation(wall) else {
            tracing::warn!(wall = %wall, "Wall orientation unknown, keeping host orientation");
            return Ok(false);
        };
        let normal = model.profile.perimeter().normal();
        if normal.dot(&facing.to_direction()) >= 0.0 {
            return Ok(false);
        }

        let ticket = queue.push(HostCommand::FlipWall { wall });
        match queue.flush()?.result(ticket) {
            Ok(_) => Ok(true),
            Err(err) => {
                tracing::warn!(wall = %wall, error = %err, "Wall flip rejected");
                Ok(false)
            }
        }
    }

    fn add_grid_lines<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        wall: HostId,
        model: &CurtainGridModel,
        report: &mut ReconstructionReport,
    ) -> Result<()> {
        let mut tickets = Vec::new();
        for line in model.grid_lines() {
            match line.full_curve.midpoint() {
                Ok(point) => tickets.push(queue.push(HostCommand::AddGridLine {
                    wall,
                    family: line.family,
                    point: Xyz::from_meters(&point),
                })),
                Err(err) => {
                    tracing::warn!(wall = %wall, error = %err, "Grid line has no midpoint");
                    report.grid_lines_rejected += 1;
                }
            }
        }

        let flushed = queue.flush()?;
        let (added, rejected) = tally(&tickets, |t| flushed.result(t), "grid line");
        report.grid_lines_added += added;
        report.grid_lines_rejected += rejected;
        Ok(())
    }

    /// A rejected removal means the segment is already absent
    fn remove_skipped_segments<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        wall: HostId,
        model: &CurtainGridModel,
        report: &mut ReconstructionReport,
    ) -> Result<()> {
        let tickets: Vec<Ticket> = model
            .skipped_segments()
            .map(|segment| {
                queue.push(HostCommand::RemoveSegment {
                    wall,
                    segment: segment.to_host(),
                })
            })
            .collect();
        if tickets.is_empty() {
            return Ok(());
        }

        let flushed = queue.flush()?;
        let (removed, rejected) = tally(&tickets, |t| flushed.result(t), "segment removal");
        report.segments_removed += removed;
        report.segments_rejected += rejected;
        Ok(())
    }

    fn add_mullions<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        wall: HostId,
        report: &mut ReconstructionReport,
    ) -> Result<()> {
        let mullion_type = self.type_named(
            queue.document(),
            TypeCategory::Mullion,
            self.config.mullion_type.as_deref(),
        );

        let derived = queue.derived()?;
        let commands: Vec<HostCommand> = [GridFamily::U, GridFamily::V]
            .into_iter()
            .flat_map(|family| derived.grid_lines(wall, family))
            .flat_map(|line| {
                let grid_line = line.id;
                line.segments.into_iter().map(move |segment| HostCommand::AddMullion {
                    grid_line,
                    segment,
                    mullion_type,
                })
            })
            .collect();

        let tickets: Vec<Ticket> = commands.into_iter().map(|c| queue.push(c)).collect();
        let flushed = queue.flush()?;
        let (added, rejected) = tally(&tickets, |t| flushed.result(t), "mullion");
        report.mullions_added += added;
        report.mullions_rejected += rejected;
        Ok(())
    }

    fn assign_panel_types<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        wall: HostId,
        model: &CurtainGridModel,
        report: &mut ReconstructionReport,
    ) -> Result<()> {
        let index = PanelCorrelationIndex::from_panels(&model.panels);
        let panel_types = queue.document().element_types(TypeCategory::CurtainPanel);
        let fallback = self.type_named(
            queue.document(),
            TypeCategory::CurtainPanel,
            self.config.fallback_panel_type.as_deref(),
        );

        let host_panels = queue.derived()?.panel_ids(wall);
        if host_panels.len() != index.len() {
            tracing::warn!(
                wall = %wall,
                host_panels = host_panels.len(),
                schema_panels = index.len(),
                "Host generated a different number of panels"
            );
        }

        let correlation = index.correlate(&host_panels);
        report.panels_untyped += correlation.unmatched.len();

        let mut tickets = Vec::with_capacity(correlation.matched.len());
        for (panel, type_name) in correlation.matched {
            let panel_type = panel_types
                .iter()
                .find(|t| t.name == type_name)
                .map(|t| t.id)
                .or(fallback);
            match panel_type {
                Some(panel_type) => {
                    tickets.push(queue.push(HostCommand::SetPanelType { panel, panel_type }))
                }
                None => {
                    tracing::warn!(panel = %panel, panel_type = type_name, "Panel type not loaded");
                    report.panels_untyped += 1;
                }
            }
        }
        if tickets.is_empty() {
            return Ok(());
        }

        let flushed = queue.flush()?;
        let (typed, rejected) = tally(&tickets, |t| flushed.result(t), "panel type");
        report.panels_typed += typed;
        report.panels_untyped += rejected;
        Ok(())
    }

    /// Every panel extruded to a thin volume, every mullion as its solid
    pub fn place_direct_shapes<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        model: &CurtainGridModel,
    ) -> Result<Vec<HostId>> {
        let thickness = self.config.direct_shape_panel_thickness;
        let mut tickets = Vec::new();

        for panel in &model.panels {
            match extrude_polygon(&panel.boundary, thickness) {
                Ok(mesh) => tickets.push(queue.push(HostCommand::CreateDirectShape {
                    name: panel.name.clone(),
                    category: DirectShapeCategory::CurtainPanel,
                    facets: mesh_facets(&mesh),
                })),
                Err(err) => tracing::warn!(panel = %panel.name, error = %err, "Panel could not be extruded"),
            }
        }
        for (index, mullion) in model.mullions().enumerate() {
            match mullion.solid() {
                Ok(mesh) => tickets.push(queue.push(HostCommand::CreateDirectShape {
                    name: format!("mullion-{}", index),
                    category: DirectShapeCategory::Mullion,
                    facets: mesh_facets(&mesh),
                })),
                Err(err) => tracing::warn!(mullion = index, error = %err, "Mullion solid unavailable"),
            }
        }

        let flushed = queue.flush()?;
        Ok(tickets
            .iter()
            .filter_map(|&ticket| match flushed.result(ticket) {
                Ok(output) => output.created_id(),
                Err(err) => {
                    tracing::warn!(error = %err, "Direct shape rejected");
                    None
                }
            })
            .collect())
    }

    /// Id of the loaded type called `name`; `None` leaves the host default
    fn type_named<D: HostDocument + ?Sized>(
        &self,
        document: &D,
        category: TypeCategory,
        name: Option<&str>,
    ) -> Option<HostId> {
        let name = name?;
        let found = document
            .element_types(category)
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.id);
        if found.is_none() {
            tracing::warn!(category = ?category, type_name = name, "Configured type not loaded, using host default");
        }
        found
    }
}

/// Host facets of a mesh, in feet
pub(crate) fn mesh_facets(mesh: &Mesh) -> Vec<[Xyz; 3]> {
    mesh.triangles()
        .map(|[a, b, c]| [Xyz::from_meters(&a), Xyz::from_meters(&b), Xyz::from_meters(&c)])
        .collect()
}

/// (accepted, rejected) over `tickets`; rejections are logged and dropped
fn tally<T>(
    tickets: &[Ticket],
    result: impl Fn(Ticket) -> bim_bridge_core::Result<T>,
    what: &'static str,
) -> (usize, usize) {
    let mut accepted = 0;
    let mut rejected = 0;
    for &ticket in tickets {
        match result(ticket) {
            Ok(_) => accepted += 1,
            Err(err) => {
                tracing::warn!(command = what, error = %err, "Host rejected command, skipping");
                rejected += 1;
            }
        }
    }
    (accepted, rejected)
}
