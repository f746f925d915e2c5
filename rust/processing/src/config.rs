// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion configuration loaded from environment variables.

use bim_bridge_geometry::{
    FaceSelection, MeshTessellator, MullionProfileResolver, ProfileExtractor, CIRCLE_SIDES,
    CURVED_LEVEL_OF_DETAIL, DEFAULT_MULLION_SIZE, DEFAULT_WELD_TOLERANCE, MERGE_TOLERANCE,
    PLANAR_LEVEL_OF_DETAIL,
};
use std::str::FromStr;

/// Conversion tolerances and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Endpoint distance under which a mullion lies on a grid line, feet.
    pub mullion_coincidence_tolerance: f64,
    /// Snapping grid for mullion sub-profile union, meters.
    pub merge_tolerance: f64,
    /// Edge of the fallback square mullion section, meters.
    pub default_mullion_size: f64,
    /// Sides of the polygon approximating round mullions.
    pub circle_sides: usize,
    /// Level of detail for planar faces and arcs.
    pub planar_level_of_detail: f64,
    /// Level of detail for curved faces.
    pub curved_level_of_detail: f64,
    /// Vertex welding distance, meters.
    pub weld_tolerance: f64,
    /// Distance under which a roof profile curve lies on a face, meters.
    pub face_contact_tolerance: f64,
    /// Thickness of panels rebuilt as direct shapes, meters.
    pub direct_shape_panel_thickness: f64,
    /// Use the mullion face closest to its start point instead of the smallest.
    pub mullion_face_closest_to_start: bool,
    /// Worker threads for batch extraction; 0 uses the global rayon pool.
    pub worker_threads: usize,
    /// Preferred curtain wall type for reconstruction.
    pub curtain_wall_type: Option<String>,
    /// Preferred mullion type for reconstruction.
    pub mullion_type: Option<String>,
    /// Panel type assigned when a panel's own type is not loaded.
    pub fallback_panel_type: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            mullion_coincidence_tolerance: 0.1,
            merge_tolerance: MERGE_TOLERANCE,
            default_mullion_size: DEFAULT_MULLION_SIZE,
            circle_sides: CIRCLE_SIDES,
            planar_level_of_detail: PLANAR_LEVEL_OF_DETAIL,
            curved_level_of_detail: CURVED_LEVEL_OF_DETAIL,
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
            face_contact_tolerance: 1e-4,
            direct_shape_panel_thickness: 0.025,
            mullion_face_closest_to_start: false,
            worker_threads: 0,
            curtain_wall_type: None,
            mullion_type: None,
            fallback_panel_type: None,
        }
    }
}

impl ConversionConfig {
    /// Load configuration from `BIM_BRIDGE_*` environment variables; unset
    /// or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mullion_coincidence_tolerance: env_or(
                "BIM_BRIDGE_MULLION_TOLERANCE",
                defaults.mullion_coincidence_tolerance,
            ),
            merge_tolerance: env_or("BIM_BRIDGE_MERGE_TOLERANCE", defaults.merge_tolerance),
            default_mullion_size: env_or(
                "BIM_BRIDGE_DEFAULT_MULLION_SIZE",
                defaults.default_mullion_size,
            ),
            circle_sides: env_or("BIM_BRIDGE_CIRCLE_SIDES", defaults.circle_sides),
            planar_level_of_detail: env_or(
                "BIM_BRIDGE_PLANAR_LOD",
                defaults.planar_level_of_detail,
            ),
            curved_level_of_detail: env_or(
                "BIM_BRIDGE_CURVED_LOD",
                defaults.curved_level_of_detail,
            ),
            weld_tolerance: env_or("BIM_BRIDGE_WELD_TOLERANCE", defaults.weld_tolerance),
            face_contact_tolerance: env_or(
                "BIM_BRIDGE_FACE_CONTACT_TOLERANCE",
                defaults.face_contact_tolerance,
            ),
            direct_shape_panel_thickness: env_or(
                "BIM_BRIDGE_PANEL_THICKNESS",
                defaults.direct_shape_panel_thickness,
            ),
            mullion_face_closest_to_start: env_or(
                "BIM_BRIDGE_MULLION_FACE_CLOSEST",
                defaults.mullion_face_closest_to_start,
            ),
            worker_threads: env_or("BIM_BRIDGE_WORKER_THREADS", defaults.worker_threads),
            curtain_wall_type: env_name("BIM_BRIDGE_CURTAIN_WALL_TYPE"),
            mullion_type: env_name("BIM_BRIDGE_MULLION_TYPE"),
            fallback_panel_type: env_name("BIM_BRIDGE_FALLBACK_PANEL_TYPE"),
        }
    }

    pub fn tessellator(&self) -> MeshTessellator {
        MeshTessellator {
            planar_level_of_detail: self.planar_level_of_detail,
            curved_level_of_detail: self.curved_level_of_detail,
            weld_tolerance: self.weld_tolerance,
        }
    }

    pub fn mullion_resolver(&self) -> MullionProfileResolver {
        MullionProfileResolver {
            circle_sides: self.circle_sides,
            merge_tolerance: self.merge_tolerance,
            default_size: self.default_mullion_size,
            face_selection: if self.mullion_face_closest_to_start {
                FaceSelection::ClosestToStart
            } else {
                FaceSelection::Smallest
            },
            level_of_detail: self.planar_level_of_detail,
        }
    }

    pub fn profile_extractor(&self) -> ProfileExtractor {
        ProfileExtractor::new().with_level_of_detail(self.planar_level_of_detail)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_name(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
