// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host geometry primitives
//!
//! Snapshots of the raw geometry a host CAD/BIM system hands over: curves,
//! faces, solids and placements. All lengths are in feet.

use crate::units::Xyz;
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// Opaque host element identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostId(pub i64);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Finest level of detail; matches the host's own default tessellation
pub const FINEST_LEVEL_OF_DETAIL: f64 = 1.0;

/// Largest angular step used at level of detail 0.0
const COARSEST_ARC_STEP: f64 = FRAC_PI_2;

/// Smallest angular step used at level of detail 1.0 (5 degrees)
const FINEST_ARC_STEP: f64 = std::f64::consts::PI / 36.0;

/// A host curve
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostCurve {
    Line {
        start: Xyz,
        end: Xyz,
    },
    /// Circular arc swept from `start_angle` to `end_angle` (radians) in the
    /// plane spanned by `x_axis` and `y_axis`
    Arc {
        center: Xyz,
        radius: f64,
        x_axis: Xyz,
        y_axis: Xyz,
        start_angle: f64,
        end_angle: f64,
    },
    HermiteSpline {
        control_points: Vec<Xyz>,
    },
}

/// A closed sequence of host curves
pub type HostCurveLoop = Vec<HostCurve>;

impl HostCurve {
    pub fn line(start: Xyz, end: Xyz) -> Self {
        HostCurve::Line { start, end }
    }

    /// Arcs and splines are curved; lines are not
    #[inline]
    pub fn is_curved(&self) -> bool {
        !matches!(self, HostCurve::Line { .. })
    }

    /// Start (`index == 0`) or end (any other index) point
    pub fn end_point(&self, index: usize) -> Xyz {
        match self {
            HostCurve::Line { start, end } => {
                if index == 0 {
                    *start
                } else {
                    *end
                }
            }
            HostCurve::Arc { start_angle, end_angle, .. } => {
                self.point_at_angle(if index == 0 { *start_angle } else { *end_angle })
            }
            HostCurve::HermiteSpline { control_points } => {
                let point = if index == 0 {
                    control_points.first()
                } else {
                    control_points.last()
                };
                point.copied().unwrap_or(Xyz::ZERO)
            }
        }
    }

    fn point_at_angle(&self, angle: f64) -> Xyz {
        match self {
            HostCurve::Arc {
                center,
                radius,
                x_axis,
                y_axis,
                ..
            } => *center + (*x_axis * angle.cos() + *y_axis * angle.sin()) * *radius,
            _ => Xyz::ZERO,
        }
    }

    /// Evaluate at a normalized parameter in `[0, 1]`
    pub fn evaluate(&self, t: f64) -> Xyz {
        let t = t.clamp(0.0, 1.0);
        match self {
            HostCurve::Line { start, end } => *start + (*end - *start) * t,
            HostCurve::Arc {
                start_angle,
                end_angle,
                ..
            } => self.point_at_angle(start_angle + (end_angle - start_angle) * t),
            HostCurve::HermiteSpline { control_points } => {
                point_along_polyline(control_points, t)
            }
        }
    }

    /// Point at the middle of the curve's parameter range
    #[inline]
    pub fn midpoint(&self) -> Xyz {
        self.evaluate(0.5)
    }

    /// Chord points along the curve, endpoints included.
    ///
    /// `level_of_detail` ranges from 0.0 (coarsest) to 1.0 (finest). Lines
    /// always yield their two endpoints and splines their control points.
    pub fn tessellate(&self, level_of_detail: f64) -> Vec<Xyz> {
        match self {
            HostCurve::Line { start, end } => vec![*start, *end],
            HostCurve::Arc {
                start_angle,
                end_angle,
                ..
            } => {
                let sweep = end_angle - start_angle;
                let segments = arc_segment_count(sweep, level_of_detail);
                (0..=segments)
                    .map(|i| {
                        let angle = start_angle + sweep * (i as f64) / (segments as f64);
                        self.point_at_angle(angle)
                    })
                    .collect()
            }
            HostCurve::HermiteSpline { control_points } => control_points.clone(),
        }
    }

    /// Shortest distance from `point` to the curve
    pub fn distance_to(&self, point: &Xyz) -> f64 {
        match self {
            HostCurve::Line { start, end } => distance_to_segment(point, start, end),
            _ => {
                let chord = self.tessellate(FINEST_LEVEL_OF_DETAIL);
                chord
                    .windows(2)
                    .map(|w| distance_to_segment(point, &w[0], &w[1]))
                    .fold(f64::INFINITY, f64::min)
            }
        }
    }

    /// Approximate curve length, in feet
    pub fn length(&self) -> f64 {
        match self {
            HostCurve::Line { start, end } => start.distance_to(end),
            HostCurve::Arc {
                radius,
                start_angle,
                end_angle,
                ..
            } => radius * (end_angle - start_angle).abs(),
            HostCurve::HermiteSpline { control_points } => polyline_length(control_points),
        }
    }
}

/// Number of chord segments used for an arc of the given sweep
pub fn arc_segment_count(sweep: f64, level_of_detail: f64) -> usize {
    let lod = level_of_detail.clamp(0.0, 1.0);
    let step = COARSEST_ARC_STEP - lod * (COARSEST_ARC_STEP - FINEST_ARC_STEP);
    // Absorb rounding so an exact multiple of the step does not gain a segment
    ((sweep.abs() / step - 1e-9).ceil() as usize).max(1)
}

fn distance_to_segment(point: &Xyz, a: &Xyz, b: &Xyz) -> f64 {
    let ab = *b - *a;
    let len_sq = ab.dot(&ab);
    if len_sq < 1e-24 {
        return point.distance_to(a);
    }
    let t = ((*point - *a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    point.distance_to(&(*a + ab * t))
}

fn polyline_length(points: &[Xyz]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

fn point_along_polyline(points: &[Xyz], t: f64) -> Xyz {
    match points.len() {
        0 => Xyz::ZERO,
        1 => points[0],
        _ => {
            let target = polyline_length(points) * t;
            let mut walked = 0.0;
            for w in points.windows(2) {
                let len = w[0].distance_to(&w[1]);
                if walked + len >= target && len > 0.0 {
                    return w[0] + (w[1] - w[0]) * ((target - walked) / len);
                }
                walked += len;
            }
            points[points.len() - 1]
        }
    }
}

/// Surface family of a host face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceKind {
    Planar,
    Conical,
    Cylindrical,
    Other,
}

/// A bounded face of a host solid
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostFace {
    pub surface: SurfaceKind,
    /// Edge loops; the host does not guarantee which loop is the outer one
    pub loops: Vec<HostCurveLoop>,
}

impl HostFace {
    pub fn planar(loops: Vec<HostCurveLoop>) -> Self {
        Self {
            surface: SurfaceKind::Planar,
            loops,
        }
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.surface == SurfaceKind::Planar
    }
}

/// A host solid, reduced to its bounding faces
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostSolid {
    pub faces: Vec<HostFace>,
}

impl HostSolid {
    pub fn planar_faces(&self) -> impl Iterator<Item = &HostFace> {
        self.faces.iter().filter(|f| f.is_planar())
    }
}

/// A host placement: origin in feet plus three basis directions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostTransform {
    pub origin: Xyz,
    pub basis_x: Xyz,
    pub basis_y: Xyz,
    pub basis_z: Xyz,
}

impl HostTransform {
    pub fn identity() -> Self {
        Self {
            origin: Xyz::ZERO,
            basis_x: Xyz::BASIS_X,
            basis_y: Xyz::BASIS_Y,
            basis_z: Xyz::BASIS_Z,
        }
    }
}

impl Default for HostTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn quarter_arc() -> HostCurve {
        HostCurve::Arc {
            center: Xyz::ZERO,
            radius: 10.0,
            x_axis: Xyz::BASIS_X,
            y_axis: Xyz::BASIS_Y,
            start_angle: 0.0,
            end_angle: PI / 2.0,
        }
    }

    #[test]
    fn test_line_end_points_and_midpoint() {
        let line = HostCurve::line(Xyz::new(0.0, 0.0, 0.0), Xyz::new(10.0, 0.0, 0.0));
        assert_eq!(line.end_point(0), Xyz::new(0.0, 0.0, 0.0));
        assert_eq!(line.end_point(1), Xyz::new(10.0, 0.0, 0.0));
        assert_eq!(line.midpoint(), Xyz::new(5.0, 0.0, 0.0));
        assert!(!line.is_curved());
    }

    #[test]
    fn test_arc_tessellation_depends_on_level_of_detail() {
        let arc = quarter_arc();
        let fine = arc.tessellate(1.0);
        let coarse = arc.tessellate(0.25);
        assert_eq!(fine.len(), 19); // 90 / 5 degrees = 18 segments
        assert!(coarse.len() < fine.len());
        assert!(fine[0].is_almost_equal_to(&Xyz::new(10.0, 0.0, 0.0), 1e-9));
        assert!(fine[18].is_almost_equal_to(&Xyz::new(0.0, 10.0, 0.0), 1e-9));
    }

    #[test]
    fn test_distance_to_line() {
        let line = HostCurve::line(Xyz::new(0.0, 0.0, 0.0), Xyz::new(10.0, 0.0, 0.0));
        assert!((line.distance_to(&Xyz::new(5.0, 3.0, 0.0)) - 3.0).abs() < 1e-12);
        assert!((line.distance_to(&Xyz::new(-4.0, 0.0, 3.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_spline_evaluates_along_control_polygon() {
        let spline = HostCurve::HermiteSpline {
            control_points: vec![
                Xyz::new(0.0, 0.0, 0.0),
                Xyz::new(4.0, 0.0, 0.0),
                Xyz::new(4.0, 4.0, 0.0),
            ],
        };
        assert!(spline.is_curved());
        assert!(spline.midpoint().is_almost_equal_to(&Xyz::new(4.0, 0.0, 0.0), 1e-9));
        assert!((spline.length() - 8.0).abs() < 1e-12);
    }
}
