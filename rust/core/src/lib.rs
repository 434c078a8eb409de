// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StrucSync Core
//!
//! Reconciliation engine for structural elements moving between two
//! independently authored models. Re-running an import never silently
//! creates duplicate or conflicting geometry.
//!
//! ## Overview
//!
//! - **Index**: [`ExistingElementIndex`] snapshots what the target model
//!   already holds, once per batch
//! - **Classification**: [`DuplicateClassifier`] labels each candidate as an
//!   exact duplicate, a location conflict, or new
//! - **Resolution**: a [`ConflictResolver`] decides Skip / Replace /
//!   CreateBoth for conflicts
//! - **Ingestion**: [`ElementIngestionPipeline`] drives create/delete calls
//!   against an [`ElementBackend`], isolates per-item failures and commits
//!   the batch atomically
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strucsync_core::{
//!     ConflictResolutionAction, ElementIngestionPipeline, FixedPolicy, ToleranceConfig,
//! };
//!
//! let mut resolver = FixedPolicy(ConflictResolutionAction::Skip);
//! let config = ToleranceConfig::default();
//! let mut pipeline = ElementIngestionPipeline::new(&mut backend, &mut resolver, config);
//! let outcome = pipeline.run(candidates)?;
//! println!("{}", outcome.summary(10));
//! ```

pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod resolve;

pub use backend::ElementBackend;
pub use classify::{Classification, DuplicateClassifier};
pub use config::ToleranceConfig;
pub use error::{BackendError, BackendResult, Error, Result};
pub use extract::{extract_all, ExtractedBatch, Extractor};
pub use index::{ExistingElementIndex, IndexEntry, SlabSignature};
pub use model::{
    ElementDescriptor, ElementHandle, ElementType, LinearElementDescriptor,
    PolygonElementDescriptor,
};
pub use outcome::{cap_messages, BatchOutcome};
pub use pipeline::ElementIngestionPipeline;
pub use resolve::{ConflictResolutionAction, ConflictResolver, FixedPolicy, ScriptedResolver};

pub use strucsync_geometry::{LengthUnit, Point3};
