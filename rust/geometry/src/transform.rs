// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid placements
//!
//! A [`Transform`] is an origin plus an orthonormal basis stored as a 4x4
//! matrix whose columns are the world-space directions of the local axes.
//! Composition is matrix multiplication.

use bim_bridge_core::HostTransform;
use nalgebra::{Matrix4, Point3, Vector3};

/// Directions closer to world Z than this are treated as vertical
const VERTICAL_DOT: f64 = 1.0 - 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build from an origin and three basis axes. The axes are normalized and
    /// re-orthogonalized against `z_axis`.
    pub fn from_basis(
        origin: Point3<f64>,
        x_axis: Vector3<f64>,
        z_axis: Vector3<f64>,
    ) -> Self {
        let z = z_axis.try_normalize(1e-12).unwrap_or_else(Vector3::z);

        // Ensure X is orthogonal to Z (project X onto plane perpendicular to Z)
        let x_orthogonal = x_axis - z * x_axis.dot(&z);
        let x = match x_orthogonal.try_normalize(1e-6) {
            Some(x) => x,
            None => default_x_axis(&z),
        };

        // Right-hand rule: Y = Z x X
        let y = z.cross(&x).normalize();

        let mut matrix = Matrix4::identity();
        matrix[(0, 0)] = x.x;
        matrix[(1, 0)] = x.y;
        matrix[(2, 0)] = x.z;
        matrix[(0, 1)] = y.x;
        matrix[(1, 1)] = y.y;
        matrix[(2, 1)] = y.z;
        matrix[(0, 2)] = z.x;
        matrix[(1, 2)] = z.y;
        matrix[(2, 2)] = z.z;
        matrix[(0, 3)] = origin.x;
        matrix[(1, 3)] = origin.y;
        matrix[(2, 3)] = origin.z;

        Self { matrix }
    }

    /// Frame whose local Z follows `direction`; local X stays horizontal
    /// unless `direction` is vertical.
    pub fn perpendicular_to(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        let z = direction.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        Self::from_basis(origin, default_x_axis(&z), z)
    }

    /// Convert a host placement: the origin is scaled to meters, the basis is
    /// unitless
    pub fn from_host(host: &HostTransform) -> Self {
        Self::from_basis(
            host.origin.to_meters(),
            host.basis_x.to_direction(),
            host.basis_z.to_direction(),
        )
    }

    pub fn translation(offset: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Rotation about the local Z axis through the origin, in degrees
    pub fn rotation_z(degrees: f64) -> Self {
        let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    #[inline]
    pub fn x_axis(&self) -> Vector3<f64> {
        Vector3::new(self.matrix[(0, 0)], self.matrix[(1, 0)], self.matrix[(2, 0)])
    }

    #[inline]
    pub fn y_axis(&self) -> Vector3<f64> {
        Vector3::new(self.matrix[(0, 1)], self.matrix[(1, 1)], self.matrix[(2, 1)])
    }

    #[inline]
    pub fn z_axis(&self) -> Vector3<f64> {
        Vector3::new(self.matrix[(0, 2)], self.matrix[(1, 2)], self.matrix[(2, 2)])
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            matrix: next.matrix * self.matrix,
        }
    }

    /// The same placement moved by `offset` in world space
    pub fn moved(&self, offset: Vector3<f64>) -> Transform {
        self.then(&Transform::translation(offset))
    }

    pub fn inverse(&self) -> Option<Transform> {
        self.matrix.try_inverse().map(|matrix| Transform { matrix })
    }

    #[inline]
    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Horizontal X axis for a frame with the given Z
fn default_x_axis(z: &Vector3<f64>) -> Vector3<f64> {
    let up = Vector3::z();
    if z.dot(&up).abs() > VERTICAL_DOT {
        Vector3::x()
    } else {
        up.cross(z).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bim_bridge_core::Xyz;

    #[test]
    fn test_rotation_z_quarter_turn() {
        let t = Transform::rotation_z(90.0);
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_frame_keeps_x_horizontal() {
        let t = Transform::perpendicular_to(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(t.z_axis(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(t.x_axis(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(t.y_axis(), Vector3::z(), epsilon = 1e-12);

        let vertical = Transform::perpendicular_to(Point3::origin(), Vector3::z());
        assert_relative_eq!(vertical.x_axis(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_composition_order() {
        let rotate = Transform::rotation_z(90.0);
        let shift = Transform::translation(Vector3::new(10.0, 0.0, 0.0));
        let p = rotate.then(&shift).apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(10.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_from_host_scales_origin_only() {
        let host = HostTransform {
            origin: Xyz::new(10.0, 0.0, 0.0),
            ..HostTransform::identity()
        };
        let t = Transform::from_host(&host);
        assert_relative_eq!(t.origin().x, 3.048, epsilon = 1e-12);
        assert_relative_eq!(t.x_axis(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::perpendicular_to(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0));
        let inv = t.inverse().unwrap();
        let p = Point3::new(4.0, -2.0, 7.0);
        assert_relative_eq!(inv.apply_point(&t.apply_point(&p)), p, epsilon = 1e-9);
    }
}
