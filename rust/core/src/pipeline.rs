// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch ingestion of candidate elements.
//!
//! ```text
//! ScanExisting -> ClassifyNext -> { AwaitResolution | Create } -> NextItem -> Commit
//! ```
//!
//! Per-item backend failures are recorded and the batch continues. The
//! final commit is the only all-or-nothing step: if it fails, the backend
//! is rolled back, the index is restored and the outcome counters are
//! reconciled to reflect that nothing was applied.

use crate::backend::ElementBackend;
use crate::classify::{Classification, DuplicateClassifier};
use crate::config::ToleranceConfig;
use crate::error::Result;
use crate::index::{ExistingElementIndex, IndexEntry};
use crate::model::{ElementDescriptor, ElementHandle, ElementType};
use crate::outcome::BatchOutcome;
use crate::resolve::{ConflictResolutionAction, ConflictResolver};

/// Drives one ingestion session against a backend.
pub struct ElementIngestionPipeline<'a, B, R>
where
    B: ElementBackend + ?Sized,
    R: ConflictResolver + ?Sized,
{
    backend: &'a mut B,
    resolver: &'a mut R,
    classifier: DuplicateClassifier,
}

impl<'a, B, R> ElementIngestionPipeline<'a, B, R>
where
    B: ElementBackend + ?Sized,
    R: ConflictResolver + ?Sized,
{
    pub fn new(backend: &'a mut B, resolver: &'a mut R, config: ToleranceConfig) -> Self {
        Self {
            backend,
            resolver,
            classifier: DuplicateClassifier::new(config),
        }
    }

    /// Scans the backend for every type present in `candidates`, then ingests.
    ///
    /// Returns `Err` only when the scan fails, before anything is mutated.
    pub fn run(&mut self, candidates: Vec<ElementDescriptor>) -> Result<BatchOutcome> {
        let mut types: Vec<ElementType> = Vec::new();
        for candidate in &candidates {
            let element_type = candidate.element_type();
            if !types.contains(&element_type) {
                types.push(element_type);
            }
        }

        let config = self.classifier.config();
        let mut index = ExistingElementIndex::scan(&*self.backend, &types, config)?;
        Ok(self.ingest(&mut index, candidates))
    }

    /// Ingests `candidates` against an already built index.
    ///
    /// The index is updated in place as elements are created and replaced,
    /// and restored to its original contents if the commit fails.
    pub fn ingest(
        &mut self,
        index: &mut ExistingElementIndex,
        candidates: Vec<ElementDescriptor>,
    ) -> BatchOutcome {
        let total = candidates.len();
        let snapshot = index.clone();
        let mut outcome = BatchOutcome::default();

        for candidate in candidates {
            self.process(index, candidate, &mut outcome);
        }

        match self.backend.commit() {
            Ok(()) => {
                outcome.committed = true;
                tracing::info!(
                    created = outcome.created,
                    skipped = outcome.skipped,
                    replaced = outcome.replaced,
                    removed = outcome.removed,
                    errors = outcome.errors.len(),
                    "Element batch committed"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    candidates = total,
                    "Element batch commit failed, rolling back"
                );
                self.backend.rollback();
                *index = snapshot;
                outcome.reconcile_rollback(total, &e);
            }
        }

        let limit = self.classifier.config().max_displayed_errors;
        for message in outcome.displayed_errors(limit) {
            tracing::debug!("{}", message);
        }

        outcome
    }

    fn process(
        &mut self,
        index: &mut ExistingElementIndex,
        candidate: ElementDescriptor,
        outcome: &mut BatchOutcome,
    ) {
        match self.classifier.classify(&candidate, index) {
            Classification::ExactDuplicate(handle) => {
                tracing::debug!(
                    candidate = %candidate,
                    existing = %handle,
                    "Exact duplicate, skipping"
                );
                outcome.skipped += 1;
            }
            Classification::New => self.create(index, candidate, outcome),
            Classification::LocationConflict(conflicts) => {
                let action = self.resolver.resolve(&candidate, &conflicts);
                tracing::debug!(
                    candidate = %candidate,
                    conflicts = conflicts.len(),
                    action = ?action,
                    "Location conflict resolved"
                );

                match action {
                    ConflictResolutionAction::Skip => outcome.skipped += 1,
                    ConflictResolutionAction::CreateBoth => {
                        self.create(index, candidate, outcome)
                    }
                    ConflictResolutionAction::Replace => {
                        self.replace(index, candidate, &conflicts, outcome)
                    }
                }
            }
        }
    }

    /// Deletes every conflict and creates the candidate, or leaves the model
    /// as it was. Staged deletions are cancelled if a later delete or the
    /// create fails. The index only changes once the create succeeded.
    fn replace(
        &mut self,
        index: &mut ExistingElementIndex,
        candidate: ElementDescriptor,
        conflicts: &[IndexEntry],
        outcome: &mut BatchOutcome,
    ) {
        let mut deleted: Vec<&ElementHandle> = Vec::with_capacity(conflicts.len());

        for entry in conflicts {
            if let Err(e) = self.backend.delete(&entry.handle) {
                tracing::warn!(
                    handle = %entry.handle,
                    error = %e,
                    "Failed to delete conflicting element"
                );
                outcome.record_error(format!(
                    "Failed to replace {}: delete of {} failed: {}",
                    candidate, entry.handle, e
                ));
                self.undo_deletes(index, &deleted, outcome);
                outcome.skipped += 1;
                return;
            }
            deleted.push(&entry.handle);
        }

        match self.backend.create(&candidate) {
            Ok(handle) => {
                tracing::debug!(
                    candidate = %candidate,
                    handle = %handle,
                    replaced = conflicts.len(),
                    "Replaced conflicting elements"
                );
                for entry in conflicts {
                    index.remove(&entry.handle);
                }
                index.insert(handle, candidate);
                outcome.created += 1;
                outcome.replaced += conflicts.len();
            }
            Err(e) => {
                tracing::warn!(candidate = %candidate, error = %e, "Failed to create replacement");
                outcome.record_error(format!("Failed to replace {}: {}", candidate, e));
                self.undo_deletes(index, &deleted, outcome);
                outcome.skipped += 1;
            }
        }
    }

    /// Cancels staged deletions. A deletion that cannot be cancelled will be
    /// committed, so it leaves the index and is counted as removed.
    fn undo_deletes(
        &mut self,
        index: &mut ExistingElementIndex,
        deleted: &[&ElementHandle],
        outcome: &mut BatchOutcome,
    ) {
        for handle in deleted.iter().rev() {
            if let Err(e) = self.backend.restore(handle) {
                tracing::warn!(handle = %handle, error = %e, "Failed to cancel deletion");
                outcome.record_error(format!(
                    "Element {} could not be restored and will be removed: {}",
                    handle, e
                ));
                index.remove(handle);
                outcome.removed += 1;
            }
        }
    }

    fn create(
        &mut self,
        index: &mut ExistingElementIndex,
        candidate: ElementDescriptor,
        outcome: &mut BatchOutcome,
    ) {
        match self.backend.create(&candidate) {
            Ok(handle) => {
                tracing::debug!(candidate = %candidate, handle = %handle, "Created element");
                index.insert(handle, candidate);
                outcome.created += 1;
            }
            Err(e) => {
                tracing::warn!(candidate = %candidate, error = %e, "Failed to create element");
                outcome.record_error(format!("Failed to create {}: {}", candidate, e));
                outcome.skipped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, BackendResult};
    use crate::model::LinearElementDescriptor;
    use crate::resolve::FixedPolicy;
    use nalgebra::Point3;

    #[derive(Default)]
    struct RecordingBackend {
        existing: Vec<(ElementDescriptor, ElementHandle)>,
        calls: Vec<String>,
        next_id: usize,
        fail_create: bool,
    }

    impl ElementBackend for RecordingBackend {
        fn find_existing(
            &self,
            element_type: ElementType,
        ) -> BackendResult<Vec<(ElementDescriptor, ElementHandle)>> {
            Ok(self
                .existing
                .iter()
                .filter(|(d, _)| d.element_type() == element_type)
                .cloned()
                .collect())
        }

        fn create(&mut self, _: &ElementDescriptor) -> BackendResult<ElementHandle> {
            if self.fail_create {
                return Err(BackendError::new("section not found"));
            }
            self.next_id += 1;
            self.calls.push(format!("create new{}", self.next_id));
            Ok(ElementHandle(format!("new{}", self.next_id)))
        }

        fn delete(&mut self, handle: &ElementHandle) -> BackendResult<()> {
            self.calls.push(format!("delete {}", handle));
            Ok(())
        }

        fn restore(&mut self, handle: &ElementHandle) -> BackendResult<()> {
            self.calls.push(format!("restore {}", handle));
            Ok(())
        }

        fn commit(&mut self) -> BackendResult<()> {
            self.calls.push("commit".into());
            Ok(())
        }

        fn rollback(&mut self) {
            self.calls.push("rollback".into());
        }
    }

    fn column(x: f64) -> ElementDescriptor {
        sized_column(x, 1.5)
    }

    fn sized_column(x: f64, size: f64) -> ElementDescriptor {
        LinearElementDescriptor::new(
            ElementType::Column,
            Point3::new(x, 0.0, 0.0),
            Point3::new(x, 0.0, 12.0),
            size,
            size,
        )
        .into()
    }

    #[test]
    fn same_candidate_twice_in_one_batch_is_created_once() {
        let mut backend = RecordingBackend::default();
        let mut resolver = FixedPolicy(ConflictResolutionAction::CreateBoth);
        let config = ToleranceConfig::default();
        let mut pipeline = ElementIngestionPipeline::new(&mut backend, &mut resolver, config);

        let outcome = pipeline.run(vec![column(0.0), column(0.0), column(20.0)]).unwrap();
        assert_eq!((outcome.created, outcome.skipped), (2, 1));
        assert!(outcome.committed);
        assert_eq!(backend.calls, ["create new1", "create new2", "commit"]);
    }

    #[test]
    fn create_failure_does_not_abort_batch() {
        let mut backend = RecordingBackend {
            fail_create: true,
            ..Default::default()
        };
        let mut resolver = FixedPolicy(ConflictResolutionAction::Skip);
        let config = ToleranceConfig::default();
        let mut pipeline = ElementIngestionPipeline::new(&mut backend, &mut resolver, config);

        let outcome = pipeline.run(vec![column(0.0), column(10.0)]).unwrap();
        assert_eq!((outcome.created, outcome.skipped), (0, 2));
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome.errors[0].contains("section not found"));
        assert!(outcome.committed);
    }

    #[test]
    fn skip_policy_leaves_existing_untouched() {
        let mut backend = RecordingBackend {
            existing: vec![(sized_column(0.0, 2.0), "old".into())],
            ..Default::default()
        };
        let mut resolver = FixedPolicy(ConflictResolutionAction::Skip);
        let config = ToleranceConfig::default();
        let mut pipeline = ElementIngestionPipeline::new(&mut backend, &mut resolver, config);

        let outcome = pipeline.run(vec![column(0.0)]).unwrap();
        assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (0, 1, 0));
        assert_eq!(backend.calls, ["commit"]);
    }

    #[test]
    fn failed_replacement_cancels_staged_delete() {
        let mut backend = RecordingBackend {
            existing: vec![(sized_column(0.0, 2.0), "old".into())],
            fail_create: true,
            ..Default::default()
        };
        let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);
        let config = ToleranceConfig::default();
        let mut pipeline = ElementIngestionPipeline::new(&mut backend, &mut resolver, config);

        let outcome = pipeline.run(vec![column(0.0)]).unwrap();
        assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (0, 1, 0));
        assert_eq!(outcome.removed, 0);
        assert_eq!(backend.calls, ["delete old", "restore old", "commit"]);
    }
}
