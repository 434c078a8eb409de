// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StrucSync Loads
//!
//! Keeps load assignments synchronized between two structural models across
//! repeated runs.
//!
//! - [`LoadPatternRegistrar`] makes sure every referenced load pattern exists
//!   before anything is applied
//! - [`LoadSyncRegistry`] persists what was synchronized, keyed by a unique
//!   identifier, so a re-run can tell new, modified, unchanged and deleted
//!   loads apart
//! - [`LoadSyncManager`] ties both together and applies loads through a
//!   [`LoadBackend`], isolating per-load failures

pub mod backend;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod patterns;
pub mod registry;

pub use backend::{ApplyRequest, ElementKind, ElementKindIndex, LoadBackend, LoadKind};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use manager::{LoadSyncManager, SyncReport};
pub use model::{LoadAssignment, LoadDirection, LoadType, SyncState};
pub use patterns::{LoadPatternCategory, LoadPatternRegistrar, PatternRules};
pub use registry::LoadSyncRegistry;
