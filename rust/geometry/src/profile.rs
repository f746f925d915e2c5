// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-section profiles

use crate::error::{Error, Result};
use crate::polygon::Polygon;
use crate::transform::Transform;
use crate::triangulation::triangulate_planar;
use nalgebra::{Point3, Vector3};

/// Default flange and web thickness of an analytic wide flange, meters
pub const WIDE_FLANGE_THICKNESS: f64 = 0.01;

/// One outer polygon plus void polygons lying inside it on the same plane.
///
/// Void containment is a caller precondition and is not checked here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    perimeter: Polygon,
    voids: Vec<Polygon>,
}

impl Profile {
    pub fn new(perimeter: Polygon, voids: Vec<Polygon>) -> Self {
        Self { perimeter, voids }
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Polygon::rectangle(width, height).into()
    }

    /// Circle approximated by a regular polygon with `sides` vertices
    pub fn circle(radius: f64, sides: usize) -> Self {
        Polygon::circle(radius, sides).into()
    }

    /// Symmetric I-section centered on the origin. Thicknesses are clamped so
    /// flanges and web never overlap.
    pub fn wide_flange(
        width: f64,
        depth: f64,
        flange_thickness: f64,
        web_thickness: f64,
    ) -> Result<Self> {
        if width <= 0.0 || depth <= 0.0 {
            return Err(Error::InvalidProfile(format!(
                "Wide flange needs positive dimensions, got {} x {}",
                width, depth
            )));
        }

        let half_width = width / 2.0;
        let half_depth = depth / 2.0;
        let tf = flange_thickness.min(depth / 4.0);
        let half_web = web_thickness.min(width / 4.0) / 2.0;

        // Counter-clockwise from bottom-left
        let points = vec![
            // Bottom flange
            Point3::new(-half_width, -half_depth, 0.0),
            Point3::new(half_width, -half_depth, 0.0),
            Point3::new(half_width, -half_depth + tf, 0.0),
            // Right side of web
            Point3::new(half_web, -half_depth + tf, 0.0),
            Point3::new(half_web, half_depth - tf, 0.0),
            // Top flange
            Point3::new(half_width, half_depth - tf, 0.0),
            Point3::new(half_width, half_depth, 0.0),
            Point3::new(-half_width, half_depth, 0.0),
            Point3::new(-half_width, half_depth - tf, 0.0),
            // Left side of web
            Point3::new(-half_web, half_depth - tf, 0.0),
            Point3::new(-half_web, -half_depth + tf, 0.0),
            Point3::new(-half_width, -half_depth + tf, 0.0),
        ];

        Ok(Polygon::new(points)?.into())
    }

    #[inline]
    pub fn perimeter(&self) -> &Polygon {
        &self.perimeter
    }

    #[inline]
    pub fn voids(&self) -> &[Polygon] {
        &self.voids
    }

    /// Net area: perimeter minus voids
    pub fn area(&self) -> f64 {
        self.perimeter.area() - self.voids.iter().map(Polygon::area).sum::<f64>()
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.perimeter.normal()
    }

    /// Extents of the perimeter along X and Y
    pub fn size_xy(&self) -> (f64, f64) {
        let (min, max) = self.perimeter.bounds();
        (max.x - min.x, max.y - min.y)
    }

    /// Map every vertex of every polygon
    pub fn transformed(&self, transform: &Transform) -> Profile {
        Profile {
            perimeter: self.perimeter.transformed(transform),
            voids: self.voids.iter().map(|v| v.transformed(transform)).collect(),
        }
    }

    /// Triangles covering the profile, wound about the perimeter normal
    pub fn triangulate(&self) -> Result<Vec<[Point3<f64>; 3]>> {
        let holes: Vec<&[Point3<f64>]> = self.voids.iter().map(Polygon::vertices).collect();
        triangulate_planar(self.perimeter.vertices(), &holes)
    }
}

impl From<Polygon> for Profile {
    fn from(perimeter: Polygon) -> Self {
        Profile {
            perimeter,
            voids: Vec::new(),
        }
    }
}
