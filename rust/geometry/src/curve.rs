// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema curves
//!
//! Host arcs and splines do not survive ingestion: they become polylines of
//! their chord points and are emitted back to the host as Hermite splines
//! through those points.

use crate::error::{Error, Result};
use crate::transform::Transform;
use bim_bridge_core::{HostCurve, Xyz};
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Polyline(Vec<Point3<f64>>),
}

impl Curve {
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Self {
        Curve::Line { start, end }
    }

    /// Convert a host curve, tessellating arcs at `level_of_detail`
    pub fn from_host(curve: &HostCurve, level_of_detail: f64) -> Self {
        match curve {
            HostCurve::Line { start, end } => Curve::Line {
                start: start.to_meters(),
                end: end.to_meters(),
            },
            HostCurve::Arc { .. } => Curve::Polyline(
                curve
                    .tessellate(level_of_detail)
                    .iter()
                    .map(Xyz::to_meters)
                    .collect(),
            ),
            HostCurve::HermiteSpline { control_points } => {
                Curve::Polyline(control_points.iter().map(Xyz::to_meters).collect())
            }
        }
    }

    /// Convert back to host units: lines stay lines, polylines become splines
    /// through their vertices
    pub fn to_host(&self) -> HostCurve {
        match self {
            Curve::Line { start, end } => {
                HostCurve::line(Xyz::from_meters(start), Xyz::from_meters(end))
            }
            Curve::Polyline(points) => HostCurve::HermiteSpline {
                control_points: points.iter().map(Xyz::from_meters).collect(),
            },
        }
    }

    pub fn vertices(&self) -> Vec<Point3<f64>> {
        match self {
            Curve::Line { start, end } => vec![*start, *end],
            Curve::Polyline(points) => points.clone(),
        }
    }

    pub fn start(&self) -> Result<Point3<f64>> {
        match self {
            Curve::Line { start, .. } => Ok(*start),
            Curve::Polyline(points) => points
                .first()
                .copied()
                .ok_or_else(|| Error::unavailable("empty polyline")),
        }
    }

    pub fn end(&self) -> Result<Point3<f64>> {
        match self {
            Curve::Line { end, .. } => Ok(*end),
            Curve::Polyline(points) => points
                .last()
                .copied()
                .ok_or_else(|| Error::unavailable("empty polyline")),
        }
    }

    pub fn length(&self) -> f64 {
        self.vertices()
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Point halfway along the curve's length
    pub fn midpoint(&self) -> Result<Point3<f64>> {
        let vertices = self.vertices();
        let first = vertices
            .first()
            .copied()
            .ok_or_else(|| Error::unavailable("empty polyline"))?;
        let target = self.length() * 0.5;
        let mut walked = 0.0;
        for w in vertices.windows(2) {
            let len = (w[1] - w[0]).norm();
            if len > 0.0 && walked + len >= target {
                return Ok(w[0] + (w[1] - w[0]) * ((target - walked) / len));
            }
            walked += len;
        }
        Ok(first)
    }

    /// Unit direction from start to end
    pub fn direction(&self) -> Result<Vector3<f64>> {
        (self.end()? - self.start()?)
            .try_normalize(1e-12)
            .ok_or_else(|| Error::unavailable("zero-length curve"))
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Curve::Line { .. })
    }

    pub fn transformed(&self, transform: &Transform) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: transform.apply_point(start),
                end: transform.apply_point(end),
            },
            Curve::Polyline(points) => {
                Curve::Polyline(points.iter().map(|p| transform.apply_point(p)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_line_converts_to_meters() {
        let host = HostCurve::line(Xyz::new(0.0, 0.0, 0.0), Xyz::new(10.0, 0.0, 0.0));
        let curve = Curve::from_host(&host, 1.0);
        assert_relative_eq!(curve.length(), 3.048, epsilon = 1e-12);
        assert!(curve.is_straight());
        assert_relative_eq!(curve.midpoint().unwrap().x, 1.524, epsilon = 1e-12);
    }

    #[test]
    fn test_arc_becomes_polyline_and_spline_on_return() {
        let arc = HostCurve::Arc {
            center: Xyz::ZERO,
            radius: 10.0,
            x_axis: Xyz::BASIS_X,
            y_axis: Xyz::BASIS_Y,
            start_angle: 0.0,
            end_angle: PI,
        };
        let curve = Curve::from_host(&arc, 1.0);
        let Curve::Polyline(points) = &curve else {
            panic!("arc should tessellate to a polyline");
        };
        assert_eq!(points.len(), 37);

        match curve.to_host() {
            HostCurve::HermiteSpline { control_points } => {
                assert_eq!(control_points.len(), 37);
                assert!(control_points[36].is_almost_equal_to(&Xyz::new(-10.0, 0.0, 0.0), 1e-9));
            }
            other => panic!("expected spline, got {:?}", other),
        }
    }

    #[test]
    fn test_direction_of_degenerate_line_fails() {
        let curve = Curve::line(Point3::origin(), Point3::origin());
        assert!(curve.direction().is_err());
    }
}
