// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed planar polygons in schema units (meters)

use crate::error::{Error, Result};
use crate::transform::Transform;
use crate::triangulation::{calculate_polygon_normal, newell_vector, PlaneBasis};
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;

/// Consecutive vertices closer than this collapse into one
pub const VERTEX_TOLERANCE: f64 = 1e-6;

/// A closed ordered vertex sequence. The closing segment is implicit: the
/// last vertex never repeats the first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Build a polygon, dropping repeated consecutive vertices and a
    /// duplicated closing vertex
    pub fn new(vertices: Vec<Point3<f64>>) -> Result<Self> {
        let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if cleaned
                .last()
                .map_or(true, |last| (last - v).norm() > VERTEX_TOLERANCE)
            {
                cleaned.push(v);
            }
        }
        while cleaned.len() > 1 {
            let closes = match (cleaned.first(), cleaned.last()) {
                (Some(first), Some(last)) => (first - last).norm() <= VERTEX_TOLERANCE,
                _ => false,
            };
            if !closes {
                break;
            }
            cleaned.pop();
        }

        if cleaned.len() < 3 {
            return Err(Error::InvalidProfile(format!(
                "Polygon needs at least 3 distinct vertices, got {}",
                cleaned.len()
            )));
        }

        Ok(Self { vertices: cleaned })
    }

    /// Polygon on the XY plane
    pub fn from_xy(points: &[Point2<f64>]) -> Result<Self> {
        Self::new(points.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect())
    }

    /// Axis-aligned rectangle centered on the origin, counter-clockwise
    pub fn rectangle(width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            vertices: vec![
                Point3::new(-half_w, -half_h, 0.0),
                Point3::new(half_w, -half_h, 0.0),
                Point3::new(half_w, half_h, 0.0),
                Point3::new(-half_w, half_h, 0.0),
            ],
        }
    }

    /// Regular polygon inscribed in a circle centered on the origin
    pub fn circle(radius: f64, sides: usize) -> Self {
        let sides = sides.max(3);
        let vertices = (0..sides)
            .map(|i| {
                let angle = (i as f64) * 2.0 * PI / (sides as f64);
                Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
            })
            .collect();
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Point3<f64> {
        self.vertices[0]
    }

    /// Unit normal following the vertex winding
    pub fn normal(&self) -> Vector3<f64> {
        calculate_polygon_normal(&self.vertices)
    }

    /// Enclosed area, independent of orientation and plane
    pub fn area(&self) -> f64 {
        newell_vector(&self.vertices).norm() * 0.5
    }

    /// Shoelace area of the XY projection; positive when counter-clockwise
    pub fn signed_area_xy(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.vertices[i].x * self.vertices[j].y;
            area -= self.vertices[j].x * self.vertices[i].y;
        }
        area * 0.5
    }

    /// Vertex average
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Axis-aligned bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        bounds_of(&self.vertices)
    }

    /// Smallest Z over all vertices
    pub fn lowest_z(&self) -> f64 {
        self.vertices
            .iter()
            .map(|p| p.z)
            .fold(f64::INFINITY, f64::min)
    }

    /// Edges in order, including the closing edge
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn reversed(&self) -> Polygon {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Polygon { vertices }
    }

    pub fn transformed(&self, transform: &Transform) -> Polygon {
        Polygon {
            vertices: self
                .vertices
                .iter()
                .map(|p| transform.apply_point(p))
                .collect(),
        }
    }

    pub fn translated(&self, offset: Vector3<f64>) -> Polygon {
        Polygon {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
        }
    }

    /// Basis on the polygon's own plane, anchored at its first vertex
    pub fn plane(&self) -> PlaneBasis {
        PlaneBasis::new(self.vertices[0], self.normal())
    }

    /// Whether `point` lies on the polygon's plane (within `tolerance`) and
    /// inside or on its boundary
    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        let plane = self.plane();
        if plane.elevation(point).abs() > tolerance {
            return false;
        }
        let contour: Vec<Point2<f64>> = self.vertices.iter().map(|p| plane.project(p)).collect();
        let target = plane.project(point);
        point_in_contour(&target, &contour) || distance_to_contour(&target, &contour) <= tolerance
    }
}

pub(crate) fn bounds_of(points: &[Point3<f64>]) -> (Point3<f64>, Point3<f64>) {
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn distance_to_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> f64 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            let ab = b - a;
            let len_sq = ab.norm_squared();
            let t = if len_sq < 1e-24 {
                0.0
            } else {
                ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
            };
            (point - (a + ab * t)).norm()
        })
        .fold(f64::INFINITY, f64::min)
}
