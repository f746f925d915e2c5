// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D boolean union of sub-profiles
//!
//! Used to merge the loops of a frame member's face into a single
//! cross-section. Input polygons are snapped to a merge grid before the union
//! so that edges touching within tolerance are shared exactly.

use crate::error::{Error, Result};
use crate::polygon::Polygon;
use crate::profile::Profile;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Default snapping grid for sub-profile union, meters
pub const MERGE_TOLERANCE: f64 = 1e-5;

/// Minimum area threshold - contours smaller than this are degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Union polygons lying on the XY plane.
///
/// Returns one profile per disjoint result shape; the first contour of each
/// shape is its outer boundary and the rest are holes.
pub fn union_xy(polygons: &[Polygon], tolerance: f64) -> Result<Vec<Profile>> {
    let mut paths: Vec<Vec<[f64; 2]>> = polygons
        .iter()
        .map(|p| snapped_path(p, tolerance))
        .filter(|path| path.len() >= 3)
        .collect();

    if paths.is_empty() {
        return Err(Error::InvalidProfile("Nothing to union".to_string()));
    }

    let subject = vec![paths.remove(0)];
    let clip = paths;

    // Result is Vec<Vec<Vec<[f64; 2]>>> - shapes, contours per shape, points per contour
    let shapes = subject.overlay(&clip, OverlayRule::Union, FillRule::EvenOdd);

    let mut profiles = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let mut contours = shape
            .into_iter()
            .map(path_to_contour)
            .filter(|c| is_valid_contour(c));
        let Some(outer) = contours.next() else {
            continue;
        };
        let perimeter = Polygon::from_xy(&outer)?;
        let voids = contours
            .map(|c| Polygon::from_xy(&c))
            .collect::<Result<Vec<_>>>()?;
        profiles.push(Profile::new(perimeter, voids));
    }

    Ok(profiles)
}

/// Union that must produce exactly one connected shape
pub fn union_single_xy(polygons: &[Polygon], tolerance: f64) -> Result<Profile> {
    let mut profiles = union_xy(polygons, tolerance)?;
    match profiles.len() {
        1 => Ok(profiles.remove(0)),
        n => Err(Error::ToleranceMismatch(format!(
            "union of {} sub-profiles produced {} shapes",
            polygons.len(),
            n
        ))),
    }
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    contour.len() >= 3 && compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

#[inline]
fn snap(value: f64, tolerance: f64) -> f64 {
    if tolerance > 0.0 {
        (value / tolerance).round() * tolerance
    } else {
        value
    }
}

fn snapped_path(polygon: &Polygon, tolerance: f64) -> Vec<[f64; 2]> {
    let mut path: Vec<[f64; 2]> = Vec::with_capacity(polygon.len());
    for p in polygon.vertices() {
        let point = [snap(p.x, tolerance), snap(p.y, tolerance)];
        if path.last() != Some(&point) {
            path.push(point);
        }
    }
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    path
}

fn path_to_contour(path: Vec<[f64; 2]>) -> Vec<Point2<f64>> {
    path.into_iter().map(|p| Point2::new(p[0], p[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn square_at(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::rectangle(size, size).translated(Vector3::new(x, y, 0.0))
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(compute_signed_area(&contour), 1.0);
        let reversed: Vec<_> = contour.into_iter().rev().collect();
        assert_relative_eq!(compute_signed_area(&reversed), -1.0);
    }

    #[test]
    fn test_adjacent_squares_merge() {
        let merged = union_single_xy(&[square_at(0.0, 0.0, 1.0), square_at(1.0, 0.0, 1.0)], MERGE_TOLERANCE)
            .unwrap();
        assert_relative_eq!(merged.area(), 2.0, epsilon = 1e-6);
        let (w, h) = merged.size_xy();
        assert_relative_eq!(w, 2.0, epsilon = 1e-6);
        assert_relative_eq!(h, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_near_touching_squares_merge_after_snapping() {
        let merged = union_single_xy(
            &[square_at(0.0, 0.0, 1.0), square_at(1.000_001, 0.0, 1.0)],
            MERGE_TOLERANCE,
        )
        .unwrap();
        assert_relative_eq!(merged.area(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_disjoint_squares_are_a_tolerance_mismatch() {
        let result = union_single_xy(&[square_at(0.0, 0.0, 1.0), square_at(5.0, 0.0, 1.0)], MERGE_TOLERANCE);
        assert!(matches!(result, Err(Error::ToleranceMismatch(_))));

        let shapes = union_xy(&[square_at(0.0, 0.0, 1.0), square_at(5.0, 0.0, 1.0)], MERGE_TOLERANCE).unwrap();
        assert_eq!(shapes.len(), 2);
    }
}
