// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM Bridge Geometry
//!
//! Schema geometry in meters (curves, polygons, profiles, meshes, placements)
//! and the extraction algorithms that derive it from host primitives: curve
//! loop classification, face tessellation using earcutr triangulation,
//! cross-section extraction and mullion section resolution. nalgebra is used
//! for all vector math.

pub mod bool2d;
pub mod curve;
pub mod error;
pub mod extrusion;
pub mod loops;
pub mod mesh;
pub mod mullion_profile;
pub mod polygon;
pub mod profile;
pub mod sections;
pub mod tessellate;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bool2d::{union_single_xy, union_xy, MERGE_TOLERANCE};
pub use curve::Curve;
pub use error::{Error, Result};
pub use extrusion::{extrude_polygon, extrude_profile, sweep_profile};
pub use loops::{loop_vertices, polygon_from_host_loop, CurveLoopSorter};
pub use mesh::{Mesh, MeshBuilder, DEFAULT_WELD_TOLERANCE};
pub use mullion_profile::{
    FaceSelection, MullionProfileMethod, MullionProfileResolver, ResolvedMullionProfile,
    CIRCLE_SIDES, DEFAULT_MULLION_SIZE,
};
pub use polygon::Polygon;
pub use profile::Profile;
pub use sections::{ExtractedProfile, ProfileExtractor, SectionStrategy};
pub use tessellate::{MeshTessellator, CURVED_LEVEL_OF_DETAIL, PLANAR_LEVEL_OF_DETAIL};
pub use transform::Transform;
pub use triangulation::{calculate_polygon_normal, triangulate_planar, PlaneBasis};
