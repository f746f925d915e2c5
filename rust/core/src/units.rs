// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit conversion between host units (feet) and schema units (meters)
//!
//! Host coordinates are carried as [`Xyz`] so that a value read from the host
//! cannot reach the schema without passing through [`Xyz::to_meters`] exactly
//! once, and cannot reach the host again without [`Xyz::from_meters`].

use nalgebra::{Point3, Vector3};
use std::ops::{Add, Mul, Sub};

/// Exact length of one international foot in meters
pub const FEET_TO_METERS: f64 = 0.3048;

/// Convert a host length (feet) into meters
#[inline]
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * FEET_TO_METERS
}

/// Convert a schema length (meters) into feet
#[inline]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters / FEET_TO_METERS
}

/// Convert a host area (square feet) into square meters
#[inline]
pub fn square_feet_to_square_meters(square_feet: f64) -> f64 {
    square_feet * FEET_TO_METERS * FEET_TO_METERS
}

/// A host-side coordinate or direction, expressed in feet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const ZERO: Xyz = Xyz::new(0.0, 0.0, 0.0);
    pub const BASIS_X: Xyz = Xyz::new(1.0, 0.0, 0.0);
    pub const BASIS_Y: Xyz = Xyz::new(0.0, 1.0, 0.0);
    pub const BASIS_Z: Xyz = Xyz::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert a host position into a schema point in meters
    #[inline]
    pub fn to_meters(&self) -> Point3<f64> {
        Point3::new(
            feet_to_meters(self.x),
            feet_to_meters(self.y),
            feet_to_meters(self.z),
        )
    }

    /// Convert a schema point in meters back into a host position
    #[inline]
    pub fn from_meters(point: &Point3<f64>) -> Self {
        Self::new(
            meters_to_feet(point.x),
            meters_to_feet(point.y),
            meters_to_feet(point.z),
        )
    }

    /// Directions are unitless and cross the boundary unscaled
    #[inline]
    pub fn to_direction(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn dot(&self, other: &Xyz) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Xyz) -> Xyz {
        Xyz::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn distance_to(&self, other: &Xyz) -> f64 {
        (*self - *other).length()
    }

    /// Returns `None` for a zero-length vector
    pub fn normalize(&self) -> Option<Xyz> {
        let len = self.length();
        if len > 1e-12 {
            Some(*self * (1.0 / len))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_almost_equal_to(&self, other: &Xyz, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
    }
}

impl Add for Xyz {
    type Output = Xyz;

    fn add(self, rhs: Xyz) -> Xyz {
        Xyz::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Xyz {
    type Output = Xyz;

    fn sub(self, rhs: Xyz) -> Xyz {
        Xyz::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Xyz {
    type Output = Xyz;

    fn mul(self, rhs: f64) -> Xyz {
        Xyz::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        assert_eq!(feet_to_meters(1.0), 0.3048);
        assert!((meters_to_feet(0.3048) - 1.0).abs() < 1e-12);
        assert!((square_feet_to_square_meters(100.0) - 9.290304).abs() < 1e-9);
    }

    #[test]
    fn test_xyz_round_trip_through_meters() {
        let host = Xyz::new(10.0, -3.5, 42.0);
        let point = host.to_meters();
        assert!((point.x - 3.048).abs() < 1e-12);
        assert!((point.z - 12.8016).abs() < 1e-12);

        let back = Xyz::from_meters(&point);
        assert!(back.is_almost_equal_to(&host, 1e-9));
    }

    #[test]
    fn test_directions_are_not_scaled() {
        let dir = Xyz::new(0.0, 1.0, 0.0);
        assert_eq!(dir.to_direction(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_cross_and_normalize() {
        let z = Xyz::BASIS_X.cross(&Xyz::BASIS_Y);
        assert_eq!(z, Xyz::BASIS_Z);
        assert!(Xyz::ZERO.normalize().is_none());
        let n = Xyz::new(3.0, 0.0, 4.0).normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
