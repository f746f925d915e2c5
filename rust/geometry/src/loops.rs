// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outer boundary / void classification of planar curve loops

use crate::error::{Error, Result};
use crate::polygon::Polygon;
use crate::profile::Profile;
use bim_bridge_core::{HostCurve, HostCurveLoop, FINEST_LEVEL_OF_DETAIL};
use nalgebra::Point3;
use smallvec::SmallVec;

/// Loops enclosing less than this many square meters are degenerate
pub const MIN_LOOP_AREA: f64 = 1e-10;

/// Chord points of a host loop in meters, each curve contributing all but
/// its end point (the next curve's start)
pub fn loop_vertices(curves: &[HostCurve], level_of_detail: f64) -> Vec<Point3<f64>> {
    let mut vertices = Vec::new();
    for curve in curves {
        let points = curve.tessellate(level_of_detail);
        let keep = points.len().saturating_sub(1).max(1);
        vertices.extend(points.iter().take(keep).map(|p| p.to_meters()));
    }
    vertices
}

/// Polygon through the chord points of a host loop
pub fn polygon_from_host_loop(curves: &[HostCurve], level_of_detail: f64) -> Result<Polygon> {
    Polygon::new(loop_vertices(curves, level_of_detail))
}

/// Picks the largest loop as the outer boundary; every other loop is a void
#[derive(Debug, Clone, Copy)]
pub struct CurveLoopSorter {
    level_of_detail: f64,
}

impl CurveLoopSorter {
    pub fn new(level_of_detail: f64) -> Self {
        Self { level_of_detail }
    }

    /// Classify polygons. Voids keep their input order. Degenerate loops are
    /// dropped with a warning; ties on area keep the earliest loop as outer.
    pub fn sort(&self, loops: impl IntoIterator<Item = Polygon>) -> Result<Profile> {
        let mut kept: SmallVec<[(Polygon, f64); 4]> = SmallVec::new();
        for (index, polygon) in loops.into_iter().enumerate() {
            let area = polygon.area();
            if area <= MIN_LOOP_AREA {
                tracing::warn!(loop_index = index, area, "Discarding zero-area curve loop");
                continue;
            }
            kept.push((polygon, area));
        }

        let mut outer_index = None;
        let mut largest = 0.0;
        for (i, (_, area)) in kept.iter().enumerate() {
            if outer_index.is_none() || *area > largest {
                outer_index = Some(i);
                largest = *area;
            }
        }

        let outer_index =
            outer_index.ok_or_else(|| Error::unavailable("no curve loop with a valid area"))?;

        let mut perimeter = None;
        let mut voids = Vec::with_capacity(kept.len().saturating_sub(1));
        for (i, (polygon, _)) in kept.into_iter().enumerate() {
            if i == outer_index {
                perimeter = Some(polygon);
            } else {
                voids.push(polygon);
            }
        }

        let perimeter = perimeter.ok_or_else(|| Error::unavailable("outer loop"))?;
        Ok(Profile::new(perimeter, voids))
    }

    /// Classify host loops, tessellating curved edges first. Loops with
    /// fewer than three distinct points are dropped with a warning.
    pub fn sort_host_loops(&self, loops: &[HostCurveLoop]) -> Result<Profile> {
        let polygons: SmallVec<[Polygon; 4]> = loops
            .iter()
            .enumerate()
            .filter_map(|(index, curves)| {
                match polygon_from_host_loop(curves, self.level_of_detail) {
                    Ok(polygon) => Some(polygon),
                    Err(err) => {
                        tracing::warn!(loop_index = index, error = %err, "Discarding degenerate curve loop");
                        None
                    }
                }
            })
            .collect();
        self.sort(polygons)
    }
}

impl Default for CurveLoopSorter {
    fn default() -> Self {
        Self::new(FINEST_LEVEL_OF_DETAIL)
    }
}
