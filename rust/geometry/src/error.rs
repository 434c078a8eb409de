// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while normalizing geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The declared source unit is not one we know a factor for.
    #[error("Unknown length unit: {0:?}")]
    UnknownUnit(String),
}
