// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authoring-tool collaborator consumed by the ingestion pipeline.

use crate::error::BackendResult;
use crate::model::{ElementDescriptor, ElementHandle, ElementType};

/// Storage side of an authoring tool.
///
/// Create and delete calls are staged; nothing is final until
/// [`commit`](ElementBackend::commit) succeeds. Calls are never retried by
/// the pipeline, so a failure is final for that element.
pub trait ElementBackend {
    /// All elements of one type currently in the model.
    fn find_existing(
        &self,
        element_type: ElementType,
    ) -> BackendResult<Vec<(ElementDescriptor, ElementHandle)>>;

    /// Stages creation of an element and returns its handle.
    fn create(&mut self, descriptor: &ElementDescriptor) -> BackendResult<ElementHandle>;

    /// Stages deletion of an element.
    fn delete(&mut self, handle: &ElementHandle) -> BackendResult<()>;

    /// Cancels a deletion staged by [`delete`](ElementBackend::delete),
    /// leaving every other staged change in place.
    fn restore(&mut self, handle: &ElementHandle) -> BackendResult<()>;

    /// Applies every staged change as one atomic unit.
    fn commit(&mut self) -> BackendResult<()>;

    /// Discards every staged change.
    fn rollback(&mut self);
}
