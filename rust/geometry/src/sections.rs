// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-section extraction for framing members
//!
//! [`ProfileExtractor`] tries an ordered list of [`SectionStrategy`] values
//! and stops at the first that yields a profile. Profiles are returned in
//! the section's local XY plane, local Y up, ready to be swept along the
//! member's driving curve.
//!
//! Members driven by an arc or spline report their local frame rotated a
//! quarter turn, so analytic sections of curved members are rotated 90°
//! about the section normal. This is an observed host behavior rather than a
//! derived rule.

use crate::error::{Error, Result};
use crate::loops::{loop_vertices, CurveLoopSorter};
use crate::polygon::{Polygon, VERTEX_TOLERANCE};
use crate::profile::{Profile, WIDE_FLANGE_THICKNESS};
use crate::transform::Transform;
use bim_bridge_core::{
    feet_to_meters, HostCurve, HostFramingMember, SectionShape, FINEST_LEVEL_OF_DETAIL,
};
use nalgebra::{Point3, Vector3};

/// Quarter-turn correction applied to analytic sections of curved members
pub const CURVED_MEMBER_ROTATION_DEGREES: f64 = 90.0;

/// Narrower extents than this are treated as missing, meters
const MIN_SECTION_EXTENT: f64 = 1e-6;

/// One way of deriving a cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionStrategy {
    /// Width and height parameters of a standard flanged shape
    Parametric,
    /// Bounding extents of the solid's planar faces across the driving curve
    FaceBounds,
    /// Boundary points of the swept cross-section, or the end face
    RawBoundary,
}

/// Profile plus the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProfile {
    pub profile: Profile,
    pub method: SectionStrategy,
    /// Extent along the section's local X, meters
    pub width: f64,
    /// Extent along the section's local Y, meters
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct ProfileExtractor {
    strategies: Vec<SectionStrategy>,
    level_of_detail: f64,
}

impl Default for ProfileExtractor {
    fn default() -> Self {
        Self {
            strategies: vec![
                SectionStrategy::Parametric,
                SectionStrategy::FaceBounds,
                SectionStrategy::RawBoundary,
            ],
            level_of_detail: FINEST_LEVEL_OF_DETAIL,
        }
    }
}

impl ProfileExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor trying only `strategies`, in the given order
    pub fn with_strategies(strategies: impl IntoIterator<Item = SectionStrategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_level_of_detail(mut self, level_of_detail: f64) -> Self {
        self.level_of_detail = level_of_detail;
        self
    }

    pub fn strategies(&self) -> &[SectionStrategy] {
        &self.strategies
    }

    /// Derive the member's cross-section.
    ///
    /// Fails with [`Error::GeometryUnavailable`] when the member has no solid.
    pub fn extract(&self, member: &HostFramingMember) -> Result<ExtractedProfile> {
        if member.solid.is_none() {
            return Err(Error::unavailable(format!("member {} has no solid", member.id)));
        }

        let mut last_error = Error::unavailable("no section strategy configured");
        for &strategy in &self.strategies {
            match self.apply(strategy, member) {
                Ok(profile) => {
                    let (width, height) = profile.size_xy();
                    return Ok(ExtractedProfile {
                        profile,
                        method: strategy,
                        width,
                        height,
                    });
                }
                Err(err) => {
                    tracing::debug!(
                        member = %member.id,
                        strategy = ?strategy,
                        error = %err,
                        "Section strategy did not apply"
                    );
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    fn apply(&self, strategy: SectionStrategy, member: &HostFramingMember) -> Result<Profile> {
        match strategy {
            SectionStrategy::Parametric => self.parametric(member),
            SectionStrategy::FaceBounds => self.face_bounds(member),
            SectionStrategy::RawBoundary => self.raw_boundary(member),
        }
    }

    fn parametric(&self, member: &HostFramingMember) -> Result<Profile> {
        if !member.section_shape.is_flanged() {
            return Err(Error::unavailable("section shape has no analytic profile"));
        }
        let (width, height) = match (member.section_width, member.section_height) {
            (Some(w), Some(h)) => (feet_to_meters(w), feet_to_meters(h)),
            _ => return Err(Error::unavailable("section width or height parameter")),
        };
        let profile = analytic_section(member.section_shape, width, height)?;
        Ok(correct_for_curvature(profile, &member.driving_curve))
    }

    fn face_bounds(&self, member: &HostFramingMember) -> Result<Profile> {
        let solid = member
            .solid
            .as_ref()
            .ok_or_else(|| Error::unavailable("solid"))?;
        let to_local = section_frame(&member.driving_curve, self.level_of_detail)?
            .inverse()
            .ok_or_else(|| Error::unavailable("invertible section frame"))?;

        let local: Vec<Point3<f64>> = solid
            .planar_faces()
            .flat_map(|face| face.loops.iter())
            .flat_map(|curves| loop_vertices(curves, self.level_of_detail))
            .map(|p| to_local.apply_point(&p))
            .collect();
        if local.is_empty() {
            return Err(Error::unavailable("planar faces"));
        }

        let (min, max) = crate::polygon::bounds_of(&local);
        let (width, height) = (max.x - min.x, max.y - min.y);
        if width < MIN_SECTION_EXTENT || height < MIN_SECTION_EXTENT {
            return Err(Error::unavailable(format!(
                "planar faces span a degenerate {} x {} section",
                width, height
            )));
        }

        let profile = analytic_section(member.section_shape, width, height)?;
        Ok(correct_for_curvature(profile, &member.driving_curve))
    }

    fn raw_boundary(&self, member: &HostFramingMember) -> Result<Profile> {
        if let Some(curves) = &member.swept_profile {
            let points = distinct_points(loop_vertices(curves, self.level_of_detail));
            match Polygon::new(points) {
                Ok(polygon) => return Ok(polygon.into()),
                Err(err) => {
                    tracing::debug!(member = %member.id, error = %err, "Swept profile is degenerate");
                }
            }
        }

        // Planar face facing along the driving curve, i.e. an end face
        let solid = member
            .solid
            .as_ref()
            .ok_or_else(|| Error::unavailable("solid"))?;
        let frame = section_frame(&member.driving_curve, self.level_of_detail)?;
        let tangent = frame.z_axis();
        let to_local = frame
            .inverse()
            .ok_or_else(|| Error::unavailable("invertible section frame"))?;
        let sorter = CurveLoopSorter::new(self.level_of_detail);

        let mut best: Option<(Polygon, f64)> = None;
        for face in solid.planar_faces() {
            let Ok(profile) = sorter.sort_host_loops(&face.loops) else {
                continue;
            };
            let alignment = profile.normal().dot(&tangent).abs();
            if best.as_ref().map_or(true, |(_, a)| alignment > *a) {
                best = Some((profile.perimeter().clone(), alignment));
            }
        }

        let (perimeter, _) =
            best.ok_or_else(|| Error::unavailable("boundary curves for the section"))?;
        let flattened = perimeter
            .vertices()
            .iter()
            .map(|p| {
                let local = to_local.apply_point(p);
                Point3::new(local.x, local.y, 0.0)
            })
            .collect();
        Ok(Polygon::new(flattened)?.into())
    }
}

/// Analytic section of the given shape family: flanged shapes become wide
/// flanges, anything else a rectangle
pub fn analytic_section(shape: SectionShape, width: f64, height: f64) -> Result<Profile> {
    if shape.is_flanged() {
        Profile::wide_flange(width, height, WIDE_FLANGE_THICKNESS, WIDE_FLANGE_THICKNESS)
    } else if width > 0.0 && height > 0.0 {
        Ok(Profile::rectangle(width, height))
    } else {
        Err(Error::InvalidProfile(format!(
            "Section needs positive dimensions, got {} x {}",
            width, height
        )))
    }
}

fn correct_for_curvature(profile: Profile, driving_curve: &HostCurve) -> Profile {
    if driving_curve.is_curved() {
        profile.transformed(&Transform::rotation_z(CURVED_MEMBER_ROTATION_DEGREES))
    } else {
        profile
    }
}

/// Frame at the start of the driving curve, local Z along its tangent
pub fn section_frame(driving_curve: &HostCurve, level_of_detail: f64) -> Result<Transform> {
    let points = driving_curve.tessellate(level_of_detail);
    let (start, next) = match points.as_slice() {
        [start, next, ..] => (start.to_meters(), next.to_meters()),
        _ => return Err(Error::unavailable("driving curve")),
    };
    let tangent: Vector3<f64> = next - start;
    if tangent.norm() < MIN_SECTION_EXTENT {
        return Err(Error::unavailable("driving curve tangent"));
    }
    Ok(Transform::perpendicular_to(start, tangent))
}

fn distinct_points(points: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if !kept.iter().any(|k| (k - p).norm() <= VERTEX_TOLERANCE) {
            kept.push(p);
        }
    }
    kept
}
