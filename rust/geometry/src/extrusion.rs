// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting planar profiles to closed meshes

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::mesh::{Mesh, MeshBuilder};
use crate::polygon::Polygon;
use crate::profile::Profile;
use crate::transform::Transform;
use crate::triangulation::newell_vector;
use nalgebra::{Point3, Vector3};

/// Extrude a planar profile (already placed in world space) along
/// `direction` by `distance`
pub fn extrude_profile(profile: &Profile, direction: Vector3<f64>, distance: f64) -> Result<Mesh> {
    let mut builder = MeshBuilder::default();
    add_extrusion(&mut builder, profile, direction, distance)?;
    builder.build()
}

/// Extrude a polygon along its own normal
pub fn extrude_polygon(polygon: &Polygon, thickness: f64) -> Result<Mesh> {
    extrude_profile(&Profile::from(polygon.clone()), polygon.normal(), thickness)
}

/// Sweep a profile defined on the local XY plane along a curve, one straight
/// extrusion per curve segment
pub fn sweep_profile(profile: &Profile, path: &Curve) -> Result<Mesh> {
    let vertices = path.vertices();
    let mut builder = MeshBuilder::default();

    for w in vertices.windows(2) {
        let segment = w[1] - w[0];
        let length = segment.norm();
        if length < 1e-9 {
            continue;
        }
        let frame = Transform::perpendicular_to(w[0], segment);
        add_extrusion(&mut builder, &profile.transformed(&frame), segment, length)?;
    }

    builder.build()
}

fn add_extrusion(
    builder: &mut MeshBuilder,
    profile: &Profile,
    direction: Vector3<f64>,
    distance: f64,
) -> Result<()> {
    if distance <= 0.0 {
        return Err(Error::InvalidExtrusion("Depth must be positive".to_string()));
    }
    let direction = direction
        .try_normalize(1e-12)
        .ok_or_else(|| Error::InvalidExtrusion("Zero extrusion direction".to_string()))?;
    if profile.normal().dot(&direction).abs() < 1e-9 {
        return Err(Error::InvalidExtrusion(
            "Extrusion direction lies in the profile plane".to_string(),
        ));
    }

    let offset = direction * distance;

    // Perimeter winds about the direction, voids against it, so every side
    // wall faces out of the solid
    let perimeter = oriented(profile.perimeter().vertices(), &direction, true);
    let voids: Vec<Vec<Point3<f64>>> = profile
        .voids()
        .iter()
        .map(|v| oriented(v.vertices(), &direction, false))
        .collect();

    // Caps
    let caps_along = profile.normal().dot(&direction) > 0.0;
    for [a, b, c] in profile.triangulate()? {
        let (a, b, c) = if caps_along { (a, b, c) } else { (a, c, b) };
        // Bottom faces against the direction
        builder.add_triangle(a, c, b);
        builder.add_triangle(a + offset, b + offset, c + offset);
    }

    // Side walls
    for ring in std::iter::once(&perimeter).chain(voids.iter()) {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            builder.add_quad(a, b, b + offset, a + offset);
        }
    }

    Ok(())
}

fn oriented(points: &[Point3<f64>], direction: &Vector3<f64>, along: bool) -> Vec<Point3<f64>> {
    let winds_along = newell_vector(points).dot(direction) > 0.0;
    let mut ring = points.to_vec();
    if winds_along != along {
        ring.reverse();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Signed volume via the divergence theorem; positive for outward faces
    fn signed_volume(mesh: &Mesh) -> f64 {
        mesh.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    #[test]
    fn test_extrude_box() {
        let mesh = extrude_profile(&Profile::rectangle(2.0, 3.0), Vector3::z(), 4.0).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(signed_volume(&mesh), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_against_normal_stays_outward() {
        let mesh = extrude_profile(&Profile::rectangle(2.0, 3.0), -Vector3::z(), 4.0).unwrap();
        assert_relative_eq!(signed_volume(&mesh), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_with_void() {
        let profile = Profile::new(
            Polygon::rectangle(4.0, 4.0),
            vec![Polygon::rectangle(2.0, 2.0)],
        );
        let mesh = extrude_profile(&profile, Vector3::z(), 1.0).unwrap();
        assert_relative_eq!(signed_volume(&mesh), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_extrusions() {
        let profile = Profile::rectangle(1.0, 1.0);
        assert!(matches!(
            extrude_profile(&profile, Vector3::z(), 0.0),
            Err(Error::InvalidExtrusion(_))
        ));
        assert!(matches!(
            extrude_profile(&profile, Vector3::x(), 1.0),
            Err(Error::InvalidExtrusion(_))
        ));
    }

    #[test]
    fn test_sweep_along_line() {
        let path = Curve::line(Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0));
        let mesh = sweep_profile(&Profile::rectangle(0.2, 0.4), &path).unwrap();
        assert_relative_eq!(signed_volume(&mesh), 0.2 * 0.4 * 5.0, epsilon = 1e-9);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(max.x - min.x, 5.0, epsilon = 1e-9);
        // Local X of the section is horizontal, local Y vertical
        assert_relative_eq!(max.y - min.y, 0.2, epsilon = 1e-9);
        assert_relative_eq!(max.z - min.z, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_polygon_along_normal() {
        let polygon = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ])
        .unwrap();
        let mesh = extrude_polygon(&polygon, 0.1).unwrap();
        assert_relative_eq!(signed_volume(&mesh).abs(), 0.4, epsilon = 1e-9);
    }
}
