// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::host::HostId;
use thiserror::Error;

/// Result type for host boundary operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single host call that the host refused or failed to carry out
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Host rejected {command}: {reason}")]
    MutationRejected {
        command: &'static str,
        reason: String,
    },

    #[error("Unknown host element {0}")]
    UnknownElement(HostId),

    #[error("Regeneration failed: {0}")]
    RegenerationFailed(String),
}

impl HostError {
    pub fn rejected(command: &'static str, reason: impl Into<String>) -> Self {
        HostError::MutationRejected {
            command,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the host boundary itself
#[derive(Error, Debug)]
pub enum Error {
    #[error("Derived geometry read with {pending} mutation(s) queued before the recompute barrier")]
    StaleGeometry { pending: usize },

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("No command outcome recorded for ticket {0}")]
    MissingOutcome(usize),
}
