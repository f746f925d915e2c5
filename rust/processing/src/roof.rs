// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roofs to envelope meshes and back
//!
//! Footprint roofs name their top and bottom faces directly. Extrusion roofs
//! do not, so their top faces are the faces the profile sketch lies on, and
//! their bottom faces are the ones the sketch lies on once dropped by the
//! roof thickness. Faces parallel to the sketch plane (the end caps) never
//! qualify.

use crate::context::ExtractionContext;
use crate::error::{Error, Result};
use crate::reconstruct::{mesh_facets, ElementReconstructor};
use crate::schema::{Material, MeshElement, Roof};
use bim_bridge_core::{
    feet_to_meters, square_feet_to_square_meters, CommandQueue, DirectShapeCategory, HostCommand,
    HostDocument, HostFace, HostId, HostRoof, RoofKind,
};
use bim_bridge_geometry::{polygon_from_host_loop, Mesh, Point3, Polygon, Vector3};
use uuid::Uuid;

/// Name of roof direct shapes and visualization meshes
pub const ROOF_NAME: &str = "Roof";

/// |cos| above which a face counts as parallel to the sketch plane
const PARALLEL_COSINE: f64 = 1.0 - 1e-6;

impl ExtractionContext<'_> {
    /// The roof and a visualization mesh of its envelope
    pub fn extract_roof(&self, roof: &HostRoof) -> Result<(Roof, MeshElement)> {
        let envelope = self.tessellator.tessellate_faces(&roof.faces)?;
        let thickness = feet_to_meters(roof.thickness);

        let (topside, underside) = match roof.kind {
            RoofKind::Footprint => (
                self.optional_mesh(roof, "topside", roof.top_faces.iter()),
                self.optional_mesh(roof, "underside", roof.bottom_faces.iter()),
            ),
            RoofKind::Extrusion => (
                self.optional_mesh(roof, "topside", self.profile_faces(roof, 0.0).into_iter()),
                self.optional_mesh(roof, "underside", self.profile_faces(roof, thickness).into_iter()),
            ),
        };

        let outer_perimeter = roof.footprint_loops.first().and_then(|curves| {
            match polygon_from_host_loop(curves, self.curve_level_of_detail()) {
                Ok(polygon) => Some(polygon),
                Err(err) => {
                    tracing::warn!(roof = %roof.id, error = %err, "Roof footprint unreadable");
                    None
                }
            }
        });

        let material = roof.top_material.as_ref().map(Material::from_host);
        let (min, max) = roof.bounding_box;

        let visualization = MeshElement {
            id: Uuid::new_v4(),
            name: ROOF_NAME.to_string(),
            mesh: envelope.clone(),
            material: material.clone(),
        };
        let roof = Roof {
            id: Uuid::new_v4(),
            name: ROOF_NAME.to_string(),
            envelope,
            topside,
            underside,
            outer_perimeter,
            elevation: feet_to_meters(min.z),
            high_point: feet_to_meters(max.z),
            thickness,
            area: square_feet_to_square_meters(roof.area),
            material,
            bottom_material: roof.bottom_material.as_ref().map(Material::from_host),
        };
        Ok((roof, visualization))
    }

    fn optional_mesh<'f>(
        &self,
        roof: &HostRoof,
        side: &'static str,
        faces: impl Iterator<Item = &'f HostFace>,
    ) -> Option<Mesh> {
        let faces: Vec<&HostFace> = faces.collect();
        if faces.is_empty() {
            tracing::debug!(roof = %roof.id, side, "No faces found for roof side");
            return None;
        }
        match self.tessellator.tessellate_faces(faces) {
            Ok(mesh) => Some(mesh),
            Err(err) => {
                tracing::warn!(roof = %roof.id, side, error = %err, "Roof side could not be tessellated");
                None
            }
        }
    }

    /// Planar faces that one of the profile curves, dropped by `depth`
    /// meters, lies on
    fn profile_faces<'r>(&self, roof: &'r HostRoof, depth: f64) -> Vec<&'r HostFace> {
        let Some(sketch_normal) = roof.sketch_normal.and_then(|n| n.normalize()) else {
            tracing::warn!(roof = %roof.id, "Extrusion roof has no sketch plane");
            return Vec::new();
        };
        let sketch_normal = sketch_normal.to_direction();
        let drop = Vector3::new(0.0, 0.0, -depth);
        let lod = self.curve_level_of_detail();

        let curves: Vec<Vec<Point3<f64>>> = roof
            .profile_curves
            .iter()
            .map(|curve| {
                let mut samples: Vec<Point3<f64>> =
                    curve.tessellate(lod).iter().map(|p| p.to_meters() + drop).collect();
                samples.push(curve.midpoint().to_meters() + drop);
                samples
            })
            .collect();

        let tolerance = self.config.face_contact_tolerance;
        roof.faces
            .iter()
            .filter(|face| face.is_planar())
            .filter(|face| {
                let Some(polygon) = face_polygon(face, lod) else {
                    return false;
                };
                if polygon.normal().dot(&sketch_normal).abs() > PARALLEL_COSINE {
                    return false;
                }
                curves
                    .iter()
                    .any(|samples| samples.iter().all(|p| polygon.contains(p, tolerance)))
            })
            .collect()
    }
}

fn face_polygon(face: &HostFace, level_of_detail: f64) -> Option<Polygon> {
    face.loops
        .first()
        .and_then(|curves| polygon_from_host_loop(curves, level_of_detail).ok())
}

impl ElementReconstructor<'_> {
    /// One direct shape from the envelope triangles
    pub fn place_roof<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        roof: &Roof,
    ) -> Result<HostId> {
        let facets = mesh_facets(&roof.envelope);
        tracing::debug!(roof = %roof.id, facets = facets.len(), "Placing roof direct shape");

        let ticket = queue.push(HostCommand::CreateDirectShape {
            name: ROOF_NAME.to_string(),
            category: DirectShapeCategory::Roof,
            facets,
        });
        queue
            .flush()?
            .result(ticket)?
            .created_id()
            .ok_or_else(|| Error::skipped(roof.id, "host created no direct shape"))
    }
}
