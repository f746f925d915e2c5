// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Required host geometry (a solid, a boundary face) is absent
    #[error("Geometry unavailable: {0}")]
    GeometryUnavailable(String),

    /// A coincidence, union or matching test found no result within tolerance
    #[error("No result within tolerance: {0}")]
    ToleranceMismatch(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),
}

impl Error {
    pub fn unavailable(what: impl Into<String>) -> Self {
        Error::GeometryUnavailable(what.into())
    }
}
