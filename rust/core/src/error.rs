// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for reconciliation.
//!
//! [`Error`] covers the fatal cases that stop a batch before anything is
//! mutated. Per-element backend failures are reported as [`BackendError`]
//! and end up in the batch outcome instead.

use thiserror::Error;

use crate::model::ElementType;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by backend collaborators.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Fatal reconciliation errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown unit or similar misconfiguration; raised before the batch starts.
    #[error("Configuration error: {0}")]
    Configuration(#[from] strucsync_geometry::Error),

    /// Querying existing elements failed, so no index could be built.
    #[error("Failed to scan existing {element_type} elements: {source}")]
    Scan {
        element_type: ElementType,
        #[source]
        source: BackendError,
    },

    /// One of the concurrent extractions failed; the join is all-or-nothing.
    #[error("Extraction of {element_type} elements failed: {source}")]
    Extraction {
        element_type: ElementType,
        #[source]
        source: BackendError,
    },
}

/// Failure reported by an authoring-tool backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
