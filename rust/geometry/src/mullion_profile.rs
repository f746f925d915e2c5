// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mullion cross-sections
//!
//! Resolution order: circular type parameters, rectangular type parameters,
//! the member's own planar faces, then a fixed default square. Resolution
//! always succeeds.

use crate::bool2d::{union_single_xy, MERGE_TOLERANCE};
use crate::error::{Error, Result};
use crate::loops::{polygon_from_host_loop, CurveLoopSorter};
use crate::polygon::{point_in_contour, Polygon};
use crate::profile::Profile;
use crate::triangulation::PlaneBasis;
use bim_bridge_core::{feet_to_meters, HostFace, HostMullion, FINEST_LEVEL_OF_DETAIL};
use nalgebra::{Point2, Point3, Vector3};

/// Sides of the polygon approximating a round mullion
pub const CIRCLE_SIDES: usize = 10;

/// Edge of the default square section, meters
pub const DEFAULT_MULLION_SIZE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MullionProfileMethod {
    Circular,
    Rectangular,
    Face,
    Default,
}

/// Which planar face of the member supplies its section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceSelection {
    /// The face with the smallest area
    #[default]
    Smallest,
    /// The face whose centroid is closest to the member's start point
    ClosestToStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMullionProfile {
    pub profile: Profile,
    /// Distance from the member's outer edge to its centerline, meters
    pub centerline_offset: f64,
    pub method: MullionProfileMethod,
}

#[derive(Debug, Clone, Copy)]
pub struct MullionProfileResolver {
    pub circle_sides: usize,
    pub merge_tolerance: f64,
    pub default_size: f64,
    pub face_selection: FaceSelection,
    pub level_of_detail: f64,
}

impl Default for MullionProfileResolver {
    fn default() -> Self {
        Self {
            circle_sides: CIRCLE_SIDES,
            merge_tolerance: MERGE_TOLERANCE,
            default_size: DEFAULT_MULLION_SIZE,
            face_selection: FaceSelection::Smallest,
            level_of_detail: FINEST_LEVEL_OF_DETAIL,
        }
    }
}

impl MullionProfileResolver {
    pub fn resolve(&self, mullion: &HostMullion) -> ResolvedMullionProfile {
        if let Some(resolved) = self.circular(mullion).or_else(|| self.rectangular(mullion)) {
            return resolved;
        }

        match self.from_faces(mullion) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::debug!(
                    mullion = %mullion.id,
                    error = %err,
                    "Using default mullion section"
                );
                self.default_profile()
            }
        }
    }

    fn circular(&self, mullion: &HostMullion) -> Option<ResolvedMullionProfile> {
        let radius = feet_to_meters(mullion.params.radius.filter(|r| *r > 0.0)?);
        Some(ResolvedMullionProfile {
            profile: Profile::circle(radius, self.circle_sides),
            centerline_offset: radius,
            method: MullionProfileMethod::Circular,
        })
    }

    fn rectangular(&self, mullion: &HostMullion) -> Option<ResolvedMullionProfile> {
        let params = &mullion.params;
        let thickness = params.thickness.filter(|t| *t > 0.0)?;
        if params.width1.is_none() && params.width2.is_none() {
            return None;
        }
        let width1 = params.width1.unwrap_or(0.0);
        let width = width1 + params.width2.unwrap_or(0.0);
        if width <= 0.0 {
            return None;
        }
        Some(ResolvedMullionProfile {
            profile: Profile::rectangle(feet_to_meters(width), feet_to_meters(thickness)),
            centerline_offset: feet_to_meters(width1),
            method: MullionProfileMethod::Rectangular,
        })
    }

    fn from_faces(&self, mullion: &HostMullion) -> Result<ResolvedMullionProfile> {
        let solid = mullion
            .solid
            .as_ref()
            .ok_or_else(|| Error::unavailable("mullion solid"))?;
        let face = self.select_face(mullion, solid.planar_faces())?;
        let (outers, holes) = split_holes(self.sub_profiles(face)?);

        let polygons: Vec<Polygon> = outers.iter().map(|(p, _)| p.clone()).collect();
        let merged = match union_single_xy(&polygons, self.merge_tolerance) {
            Ok(profile) => profile,
            Err(err) => {
                tracing::debug!(
                    mullion = %mullion.id,
                    error = %err,
                    "Sub-profile union failed, keeping the lowest sub-profile"
                );
                lowest(outers)?
            }
        };
        let voids = merged
            .voids()
            .iter()
            .cloned()
            .chain(holes.into_iter().filter(|hole| encloses(merged.perimeter(), hole)))
            .collect();
        let profile = Profile::new(merged.perimeter().clone(), voids);

        let (width, _) = profile.size_xy();
        Ok(ResolvedMullionProfile {
            profile,
            centerline_offset: width / 2.0,
            method: MullionProfileMethod::Face,
        })
    }

    fn select_face<'a>(
        &self,
        mullion: &HostMullion,
        faces: impl Iterator<Item = &'a HostFace>,
    ) -> Result<&'a HostFace> {
        let sorter = CurveLoopSorter::new(self.level_of_detail);
        let mut candidates: Vec<(&HostFace, Profile)> = faces
            .filter_map(|face| sorter.sort_host_loops(&face.loops).ok().map(|p| (face, p)))
            .collect();
        candidates.sort_by(|a, b| {
            a.1.perimeter()
                .area()
                .total_cmp(&b.1.perimeter().area())
        });

        let start = mullion
            .location_curve
            .as_ref()
            .map(|curve| curve.end_point(0).to_meters());
        let chosen = match (self.face_selection, start) {
            (FaceSelection::ClosestToStart, Some(start)) => candidates.iter().min_by(|a, b| {
                let da = (a.1.perimeter().centroid() - start).norm();
                let db = (b.1.perimeter().centroid() - start).norm();
                da.total_cmp(&db)
            }),
            _ => candidates.first(),
        };

        chosen
            .map(|(face, _)| *face)
            .ok_or_else(|| Error::unavailable("planar mullion face"))
    }

    /// Every loop of `face` as a polygon on the face's own 2D basis, paired
    /// with its lowest world Z
    fn sub_profiles(&self, face: &HostFace) -> Result<Vec<(Polygon, f64)>> {
        let polygons: Vec<Polygon> = face
            .loops
            .iter()
            .filter_map(|curves| polygon_from_host_loop(curves, self.level_of_detail).ok())
            .collect();
        let first = polygons
            .first()
            .ok_or_else(|| Error::unavailable("mullion face loops"))?;

        let all: Vec<Point3<f64>> = polygons.iter().flat_map(|p| p.vertices().to_vec()).collect();
        let centroid = Point3::from(
            all.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / all.len() as f64,
        );
        let basis = PlaneBasis::new(centroid, first.normal());

        polygons
            .iter()
            .map(|polygon| {
                let local: Vec<Point2<f64>> =
                    polygon.vertices().iter().map(|p| basis.project(p)).collect();
                Ok((Polygon::from_xy(&local)?, polygon.lowest_z()))
            })
            .collect()
    }

    fn default_profile(&self) -> ResolvedMullionProfile {
        ResolvedMullionProfile {
            profile: Profile::rectangle(self.default_size, self.default_size),
            centerline_offset: self.default_size / 2.0,
            method: MullionProfileMethod::Default,
        }
    }
}

/// Separates loops lying entirely inside a larger loop of the same face
fn split_holes(sub_profiles: Vec<(Polygon, f64)>) -> (Vec<(Polygon, f64)>, Vec<Polygon>) {
    let is_hole: Vec<bool> = sub_profiles
        .iter()
        .enumerate()
        .map(|(i, (inner, _))| {
            sub_profiles
                .iter()
                .enumerate()
                .any(|(j, (outer, _))| i != j && outer.area() > inner.area() && encloses(outer, inner))
        })
        .collect();

    let mut outers = Vec::new();
    let mut holes = Vec::new();
    for (sub, hole) in sub_profiles.into_iter().zip(is_hole) {
        if hole {
            holes.push(sub.0);
        } else {
            outers.push(sub);
        }
    }
    (outers, holes)
}

/// Every vertex of `inner` strictly inside `outer`, both on the XY plane
fn encloses(outer: &Polygon, inner: &Polygon) -> bool {
    let contour: Vec<Point2<f64>> = outer.vertices().iter().map(|p| p.xy()).collect();
    inner
        .vertices()
        .iter()
        .all(|p| point_in_contour(&p.xy(), &contour))
}

fn lowest(outers: Vec<(Polygon, f64)>) -> Result<Profile> {
    outers
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(polygon, _)| polygon.into())
        .ok_or_else(|| Error::unavailable("mullion sub-profile"))
}
