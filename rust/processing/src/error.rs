// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bim_bridge_core::HostError;
use thiserror::Error;

/// Result type for element conversion
pub type Result<T> = std::result::Result<T, Error>;

/// Errors scoped to the conversion of one element
#[derive(Error, Debug)]
pub enum Error {
    /// A gridded assembly has no grid where one is expected
    #[error("Unsupported topology: {0}")]
    UnsupportedTopology(String),

    #[error("Invalid identity token {token:?}: {reason}")]
    InvalidIdentityToken { token: String, reason: String },

    #[error("Element {element} skipped: {reason}")]
    ElementSkipped { element: String, reason: String },

    #[error("Geometry error: {0}")]
    Geometry(#[from] bim_bridge_geometry::Error),

    #[error("Host boundary error: {0}")]
    Core(#[from] bim_bridge_core::Error),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn skipped(element: impl ToString, reason: impl Into<String>) -> Self {
        Error::ElementSkipped {
            element: element.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_token(token: &str, reason: impl Into<String>) -> Self {
        Error::InvalidIdentityToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
