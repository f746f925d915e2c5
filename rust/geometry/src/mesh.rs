// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! A [`Mesh`] is immutable once built. Vertices are welded by
//! [`MeshBuilder`] and per-vertex normals are always the normalized sum of
//! the adjacent triangle normals, computed once in [`MeshBuilder::build`].

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Vertices closer than this are welded, meters
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-6;

/// Triangle mesh with welded vertices
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    indices: Vec<u32>,
}

impl Mesh {
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Triangle indices (i0, i1, i2)
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Corner positions of every triangle
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.positions.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        crate::polygon::bounds_of(&self.positions)
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() * 0.5)
            .sum()
    }

    /// Weld several meshes into one
    pub fn merge_all<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Result<Mesh> {
        let mut builder = MeshBuilder::default();
        for mesh in meshes {
            builder.extend_from(mesh);
        }
        builder.build()
    }
}

/// Accumulates triangles, welding each vertex to the earliest one within
/// the tolerance.
///
/// Vertices are bucketed on a grid whose cell edge is the tolerance, so a
/// match is always in the same cell or one of its 26 neighbours.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    tolerance: f64,
    positions: Vec<Point3<f64>>,
    indices: Vec<u32>,
    lookup: FxHashMap<(i64, i64, i64), SmallVec<[u32; 1]>>,
}

impl MeshBuilder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(f64::EPSILON),
            positions: Vec::new(),
            indices: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    #[inline]
    fn key(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.tolerance).round() as i64,
            (p.y / self.tolerance).round() as i64,
            (p.z / self.tolerance).round() as i64,
        )
    }

    /// Index of the welded vertex at `position`
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let (x, y, z) = self.key(&position);
        if let Some(index) = self.find_within(&position, (x, y, z)) {
            return index;
        }
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.lookup.entry((x, y, z)).or_default().push(index);
        index
    }

    fn find_within(&self, position: &Point3<f64>, (x, y, z): (i64, i64, i64)) -> Option<u32> {
        let mut found: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.lookup.get(&(x + dx, y + dy, z + dz)) else {
                        continue;
                    };
                    for &index in bucket {
                        let distance = (self.positions[index as usize] - position).norm();
                        if distance <= self.tolerance && found.map_or(true, |f| index < f) {
                            found = Some(index);
                        }
                    }
                }
            }
        }
        found
    }

    /// Add a triangle; triangles collapsing to fewer than three welded
    /// vertices are dropped
    pub fn add_triangle(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) {
        let i0 = self.add_vertex(a);
        let i1 = self.add_vertex(b);
        let i2 = self.add_vertex(c);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return;
        }
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a planar quad as two triangles, `a b c d` in winding order
    pub fn add_quad(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, d: Point3<f64>) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    pub fn extend_from(&mut self, mesh: &Mesh) {
        for [a, b, c] in mesh.triangles() {
            self.add_triangle(a, b, c);
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Finish the mesh, computing vertex normals from the final triangle set
    pub fn build(self) -> Result<Mesh> {
        if self.indices.is_empty() {
            return Err(Error::EmptyMesh("no triangles were added".to_string()));
        }

        let mut normals = vec![Vector3::zeros(); self.positions.len()];

        // Accumulate face normals
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let v0 = self.positions[i0];
            let v1 = self.positions[i1];
            let v2 = self.positions[i2];

            let normal = (v1 - v0).cross(&(v2 - v0));
            let normal = normal.try_normalize(1e-20).unwrap_or_else(Vector3::zeros);

            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        }

        Ok(Mesh {
            positions: self.positions,
            normals,
            indices: self.indices,
        })
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WELD_TOLERANCE)
    }
}
