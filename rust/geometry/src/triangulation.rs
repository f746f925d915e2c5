// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Planar polygons are projected into a local 2D basis and triangulated with
//! earcutr. Output triangles are wound counter-clockwise about the outer
//! boundary's normal.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a 2D outer contour with optional holes.
/// Returns triangle indices into the outer points followed by every hole's points.
pub fn triangulate_contours(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    let n = outer.len();
    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    let valid_holes: Vec<&Vec<Point2<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();

    if valid_holes.is_empty() {
        if n == 3 {
            return Ok(vec![0, 1, 2]);
        }
        // FAST PATH: small convex polygon - fan
        if n <= 8 && is_convex(outer) {
            return Ok(fan_triangulate(n));
        }
    }

    let total_points: usize = n + valid_holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(valid_holes.len());
    for hole in valid_holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    if indices.is_empty() {
        return Err(Error::TriangulationError(
            "Polygon produced no triangles".to_string(),
        ));
    }

    Ok(indices)
}

/// Right-handed 2D coordinate system on a plane: `u x v = normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneBasis {
    /// Basis on the plane through `origin` with the given (unit) normal
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        // Find the axis least parallel to the normal for stable cross product
        let abs_x = normal.x.abs();
        let abs_y = normal.y.abs();
        let abs_z = normal.z.abs();

        let reference = if abs_x <= abs_y && abs_x <= abs_z {
            Vector3::new(1.0, 0.0, 0.0)
        } else if abs_y <= abs_z {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u_axis = normal.cross(&reference).normalize();
        let v_axis = normal.cross(&u_axis).normalize();

        Self {
            origin,
            u_axis,
            v_axis,
            normal,
        }
    }

    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        let v = point - self.origin;
        Point2::new(v.dot(&self.u_axis), v.dot(&self.v_axis))
    }

    #[inline]
    pub fn lift(&self, point: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u_axis * point.x + self.v_axis * point.y
    }

    /// Signed distance of `point` from the plane along its normal
    #[inline]
    pub fn elevation(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }
}

/// Newell's method: a vector along the polygon normal whose length is twice
/// the enclosed area
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

/// Unit normal of a polygon, +Z for degenerate input
#[inline]
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    if points.len() < 3 {
        return Vector3::z();
    }
    newell_vector(points)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::z)
}

/// Triangulate a planar outer boundary with holes in 3D.
///
/// Holes are assumed to lie inside `outer` on the same plane.
pub fn triangulate_planar(
    outer: &[Point3<f64>],
    holes: &[&[Point3<f64>]],
) -> Result<Vec<[Point3<f64>; 3]>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    let normal = calculate_polygon_normal(outer);
    let basis = PlaneBasis::new(outer[0], normal);

    let outer_2d: Vec<Point2<f64>> = outer.iter().map(|p| basis.project(p)).collect();
    let holes_2d: Vec<Vec<Point2<f64>>> = holes
        .iter()
        .map(|h| h.iter().map(|p| basis.project(p)).collect())
        .collect();

    let indices = triangulate_contours(&outer_2d, &holes_2d)?;

    let all_points: Vec<Point3<f64>> = outer
        .iter()
        .copied()
        .chain(holes.iter().filter(|h| h.len() >= 3).flat_map(|h| h.iter().copied()))
        .collect();
    let all_2d: Vec<Point2<f64>> = outer_2d
        .iter()
        .copied()
        .chain(holes_2d.iter().filter(|h| h.len() >= 3).flat_map(|h| h.iter().copied()))
        .collect();

    let mut triangles = Vec::with_capacity(indices.len() / 3);
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let (pa, pb, pc) = (all_2d[a], all_2d[b], all_2d[c]);
        let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
        if cross >= 0.0 {
            triangles.push([all_points[a], all_points[b], all_points[c]]);
        } else {
            triangles.push([all_points[a], all_points[c], all_points[b]]);
        }
    }

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_2d(min: f64, max: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    #[test]
    fn test_triangulate_square() {
        let indices = triangulate_contours(&square_2d(0.0, 1.0), &[]).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_contours(&points, &[]).is_err());
    }

    #[test]
    fn test_triangulate_square_with_hole() {
        let indices =
            triangulate_contours(&square_2d(0.0, 10.0), &[square_2d(3.0, 7.0)]).unwrap();
        assert!(indices.len() > 6);
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_newell_area_of_vertical_square() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let newell = newell_vector(&points);
        assert!((newell.norm() / 2.0 - 4.0).abs() < 1e-12);
        let normal = calculate_polygon_normal(&points);
        assert!((normal.y.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_planar_triangles_follow_outer_winding() {
        // Clockwise when seen from +Z, so the normal points down
        let outer = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 4.0, 1.0),
            Point3::new(4.0, 4.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
        ];
        let hole = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 1.0, 1.0),
            Point3::new(3.0, 3.0, 1.0),
            Point3::new(1.0, 3.0, 1.0),
        ];
        let triangles = triangulate_planar(&outer, &[&hole]).unwrap();
        let area: f64 = triangles
            .iter()
            .map(|[a, b, c]| {
                let n = (b - a).cross(&(c - a));
                assert!(n.z <= 1e-12);
                n.norm() / 2.0
            })
            .sum();
        assert!((area - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_plane_basis_round_trip() {
        let basis = PlaneBasis::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 1.0, 0.0));
        let p = Point3::new(3.0, 1.0, -2.0);
        let back = basis.lift(&basis.project(&p));
        assert!((back - p).norm() < 1e-12);
        assert!(basis.elevation(&p).abs() < 1e-12);
        assert!((basis.u_axis.cross(&basis.v_axis) - basis.normal).norm() < 1e-12);
    }
}
