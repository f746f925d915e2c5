// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face and polygon tessellation
//!
//! Faces are reduced to their boundary chord points at a level of detail
//! chosen by surface kind, classified with [`CurveLoopSorter`] and
//! triangulated on their best-fit plane. Every face of one call shares a
//! single [`MeshBuilder`], so vertex welding spans faces and the result does
//! not depend on face order.

use crate::error::{Error, Result};
use crate::loops::CurveLoopSorter;
use crate::mesh::{Mesh, MeshBuilder, DEFAULT_WELD_TOLERANCE};
use crate::polygon::Polygon;
use crate::profile::Profile;
use bim_bridge_core::{HostFace, SurfaceKind};

/// Level of detail for planar faces
pub const PLANAR_LEVEL_OF_DETAIL: f64 = 1.0;

/// Level of detail for curved (conical, cylindrical, free-form) faces
pub const CURVED_LEVEL_OF_DETAIL: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTessellator {
    pub planar_level_of_detail: f64,
    pub curved_level_of_detail: f64,
    pub weld_tolerance: f64,
}

impl Default for MeshTessellator {
    fn default() -> Self {
        Self {
            planar_level_of_detail: PLANAR_LEVEL_OF_DETAIL,
            curved_level_of_detail: CURVED_LEVEL_OF_DETAIL,
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
        }
    }
}

impl MeshTessellator {
    pub fn level_of_detail_for(&self, surface: SurfaceKind) -> f64 {
        match surface {
            SurfaceKind::Planar => self.planar_level_of_detail,
            SurfaceKind::Conical | SurfaceKind::Cylindrical | SurfaceKind::Other => {
                self.curved_level_of_detail
            }
        }
    }

    pub fn tessellate_face(&self, face: &HostFace) -> Result<Mesh> {
        let mut builder = MeshBuilder::new(self.weld_tolerance);
        self.add_face(&mut builder, face)?;
        builder.build()
    }

    /// One welded mesh for many faces. Faces that cannot be triangulated are
    /// skipped with a warning.
    pub fn tessellate_faces<'a>(&self, faces: impl IntoIterator<Item = &'a HostFace>) -> Result<Mesh> {
        let mut builder = MeshBuilder::new(self.weld_tolerance);
        let mut skipped = 0usize;
        for (index, face) in faces.into_iter().enumerate() {
            if let Err(err) = self.add_face(&mut builder, face) {
                tracing::warn!(face_index = index, error = %err, "Skipping face that could not be tessellated");
                skipped += 1;
            }
        }
        builder.build().map_err(|_| {
            Error::EmptyMesh(format!("no face could be tessellated ({} skipped)", skipped))
        })
    }

    pub fn tessellate_polygon(&self, polygon: &Polygon) -> Result<Mesh> {
        self.tessellate_profile(&Profile::from(polygon.clone()))
    }

    pub fn tessellate_profile(&self, profile: &Profile) -> Result<Mesh> {
        let mut builder = MeshBuilder::new(self.weld_tolerance);
        for [a, b, c] in profile.triangulate()? {
            builder.add_triangle(a, b, c);
        }
        builder.build()
    }

    fn add_face(&self, builder: &mut MeshBuilder, face: &HostFace) -> Result<()> {
        let sorter = CurveLoopSorter::new(self.level_of_detail_for(face.surface));
        let profile = sorter.sort_host_loops(&face.loops)?;
        for [a, b, c] in profile.triangulate()? {
            builder.add_triangle(a, b, c);
        }
        Ok(())
    }
}
