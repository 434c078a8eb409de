// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for load synchronization.
//!
//! Everything here aborts the sync. Individual apply failures are not
//! errors; they are counted in the [`SyncReport`](crate::SyncReport).

use std::path::PathBuf;

use strucsync_core::BackendError;

/// Result type alias for load synchronization.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal load synchronization errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Existing load patterns could not be listed.
    #[error("failed to query load patterns: {0}")]
    PatternQuery(#[source] BackendError),

    /// A referenced load pattern could not be created.
    #[error("unresolved load pattern {name:?}: {source}")]
    UnresolvedPattern {
        name: String,
        #[source]
        source: BackendError,
    },

    /// Frame/area name lists could not be read from the backend.
    #[error("failed to query target elements: {0}")]
    ElementQuery(#[source] BackendError),

    /// The registry file could not be read or written.
    #[error("registry I/O error at {}: {source}", path.display())]
    RegistryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but is not a valid registry document.
    #[error("registry at {} is corrupt: {source}", path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry could not be serialized.
    #[error("registry serialization error: {0}")]
    RegistrySerialize(#[from] serde_json::Error),
}
