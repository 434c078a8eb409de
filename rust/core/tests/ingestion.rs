// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end ingestion against an in-memory backend with staged commits.

use strucsync_core::{
    BackendError, BackendResult, BatchOutcome, ConflictResolutionAction, ConflictResolver,
    ElementBackend, ElementDescriptor, ElementHandle, ElementIngestionPipeline, ElementType,
    ExistingElementIndex, FixedPolicy, LinearElementDescriptor, PolygonElementDescriptor,
    ScriptedResolver, ToleranceConfig,
};
use strucsync_geometry::{LengthUnit, Point3};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Backend that stages changes and applies them on commit.
#[derive(Default)]
struct MemoryBackend {
    committed: Vec<(ElementDescriptor, ElementHandle)>,
    staged_creates: Vec<(ElementDescriptor, ElementHandle)>,
    staged_deletes: Vec<ElementHandle>,
    next_id: usize,
    fail_commit: bool,
    fail_create: bool,
    fail_delete: Option<ElementHandle>,
    fail_restore: bool,
    deleted_log: Vec<ElementHandle>,
}

impl MemoryBackend {
    fn with_existing(elements: Vec<(&str, ElementDescriptor)>) -> Self {
        Self {
            committed: elements
                .into_iter()
                .map(|(h, d)| (d, ElementHandle::from(h)))
                .collect(),
            ..Default::default()
        }
    }

    fn handles(&self) -> Vec<String> {
        self.committed.iter().map(|(_, h)| h.to_string()).collect()
    }
}

impl ElementBackend for MemoryBackend {
    fn find_existing(
        &self,
        element_type: ElementType,
    ) -> BackendResult<Vec<(ElementDescriptor, ElementHandle)>> {
        Ok(self
            .committed
            .iter()
            .filter(|(d, _)| d.element_type() == element_type)
            .cloned()
            .collect())
    }

    fn create(&mut self, descriptor: &ElementDescriptor) -> BackendResult<ElementHandle> {
        if self.fail_create {
            return Err(BackendError::new("section not found"));
        }
        self.next_id += 1;
        let handle = ElementHandle(format!("created-{}", self.next_id));
        self.staged_creates.push((descriptor.clone(), handle.clone()));
        Ok(handle)
    }

    fn delete(&mut self, handle: &ElementHandle) -> BackendResult<()> {
        if self.fail_delete.as_ref() == Some(handle) {
            return Err(BackendError::new("element is locked"));
        }
        self.staged_deletes.push(handle.clone());
        Ok(())
    }

    fn restore(&mut self, handle: &ElementHandle) -> BackendResult<()> {
        if self.fail_restore {
            return Err(BackendError::new("undo history unavailable"));
        }
        self.staged_deletes.retain(|h| h != handle);
        Ok(())
    }

    fn commit(&mut self) -> BackendResult<()> {
        if self.fail_commit {
            return Err(BackendError::new("transaction aborted by host"));
        }
        let deletes = std::mem::take(&mut self.staged_deletes);
        self.committed.retain(|(_, h)| !deletes.contains(h));
        self.deleted_log.extend(deletes);
        self.committed.append(&mut self.staged_creates);
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged_creates.clear();
        self.staged_deletes.clear();
    }
}

const MM: f64 = 1.0 / 304.8;

fn run_batch<R: ConflictResolver>(
    backend: &mut MemoryBackend,
    resolver: &mut R,
    candidates: Vec<ElementDescriptor>,
) -> BatchOutcome {
    ElementIngestionPipeline::new(backend, resolver, ToleranceConfig::default())
        .run(candidates)
        .unwrap()
}

fn beam(start: [f64; 3], end: [f64; 3], width: f64, depth: f64) -> ElementDescriptor {
    LinearElementDescriptor::new(
        ElementType::Beam,
        Point3::new(start[0], start[1], start[2]),
        Point3::new(end[0], end[1], end[2]),
        width,
        depth,
    )
    .into()
}

fn slab(points: &[[f64; 2]], z: f64, thickness: f64) -> ElementDescriptor {
    PolygonElementDescriptor::new(
        points.iter().map(|p| Point3::new(p[0], p[1], z)).collect(),
        thickness,
    )
    .into()
}

#[test]
fn duplicate_beam_within_tolerance_is_skipped() {
    init_tracing();
    let existing = beam([0.0, 0.0, 10.0], [20.0, 0.0, 10.0], 1.0, 2.0);
    let mut backend = MemoryBackend::with_existing(vec![("b1", existing)]);
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    // 2 mm off at both ends, 8 mm wider and 4 mm shallower
    let candidate = beam(
        [2.0 * MM, 0.0, 10.0],
        [20.0, -2.0 * MM, 10.0],
        1.0 + 8.0 * MM,
        2.0 - 4.0 * MM,
    );

    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.committed);
    assert_eq!(backend.handles(), ["b1"]);
}

#[test]
fn wider_beam_with_replace_deletes_prior_element() {
    init_tracing();
    let existing = beam([0.0, 0.0, 10.0], [20.0, 0.0, 10.0], 1.0, 2.0);
    let mut backend = MemoryBackend::with_existing(vec![("b1", existing)]);
    let mut resolver =
        ScriptedResolver::new([ConflictResolutionAction::Replace], ConflictResolutionAction::Skip);

    let candidate = beam([0.0, 0.0, 10.0], [20.0, 0.0, 10.0], 1.0 + 50.0 * MM, 2.0);
    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.replaced, 1);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(resolver.asked(), 1);
    assert_eq!(backend.deleted_log, [ElementHandle::from("b1")]);
    assert_eq!(backend.handles(), ["created-1"]);
}

#[test]
fn replace_removes_every_conflicting_element() {
    let line = ([0.0, 0.0, 0.0], [15.0, 0.0, 0.0]);
    let mut backend = MemoryBackend::with_existing(vec![
        ("wide", beam(line.0, line.1, 2.0, 2.0)),
        ("deep", beam(line.1, line.0, 1.0, 3.0)),
    ]);
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    let outcome = run_batch(&mut backend, &mut resolver, vec![beam(line.0, line.1, 1.0, 2.0)]);

    assert_eq!((outcome.created, outcome.replaced), (1, 2));
    assert_eq!(backend.handles(), ["created-1"]);
}

#[test]
fn failed_delete_skips_the_replacement() {
    let line = ([0.0, 0.0, 0.0], [15.0, 0.0, 0.0]);
    let mut backend =
        MemoryBackend::with_existing(vec![("locked", beam(line.0, line.1, 2.0, 2.0))]);
    backend.fail_delete = Some("locked".into());
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    let candidates = vec![
        beam(line.0, line.1, 1.0, 2.0),
        beam([0.0, 30.0, 0.0], [15.0, 30.0, 0.0], 1.0, 2.0),
    ];
    let outcome = run_batch(&mut backend, &mut resolver, candidates);

    assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (1, 1, 0));
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("element is locked"));
    assert_eq!(backend.handles(), ["locked", "created-1"]);
}

fn two_conflicts() -> MemoryBackend {
    let line = ([0.0, 0.0, 0.0], [15.0, 0.0, 0.0]);
    MemoryBackend::with_existing(vec![
        ("wide", beam(line.0, line.1, 2.0, 2.0)),
        ("locked", beam(line.1, line.0, 1.0, 3.0)),
    ])
}

#[test]
fn second_delete_failure_keeps_the_first_conflict() {
    init_tracing();
    let mut backend = two_conflicts();
    backend.fail_delete = Some("locked".into());
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    let candidate = beam([0.0, 0.0, 0.0], [15.0, 0.0, 0.0], 1.0, 2.0);
    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert!(outcome.committed);
    assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (0, 1, 0));
    assert_eq!(outcome.removed, 0);
    assert_eq!(backend.handles(), ["wide", "locked"]);
    assert!(backend.deleted_log.is_empty());
}

#[test]
fn failed_create_keeps_every_conflict() {
    let mut backend = two_conflicts();
    backend.fail_create = true;
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    let candidate = beam([0.0, 0.0, 0.0], [15.0, 0.0, 0.0], 1.0, 2.0);
    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (0, 1, 0));
    assert_eq!(outcome.removed, 0);
    assert!(outcome.errors[0].contains("section not found"));
    assert_eq!(backend.handles(), ["wide", "locked"]);
    assert!(backend.deleted_log.is_empty());
}

#[test]
fn uncancellable_delete_is_counted_as_removed() {
    let mut backend = two_conflicts();
    backend.fail_delete = Some("locked".into());
    backend.fail_restore = true;
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    let candidate = beam([0.0, 0.0, 0.0], [15.0, 0.0, 0.0], 1.0, 2.0);
    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert_eq!((outcome.created, outcome.skipped, outcome.replaced), (0, 1, 0));
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[1].contains("could not be restored"));
    assert_eq!(backend.handles(), ["locked"]);
    assert_eq!(backend.deleted_log, [ElementHandle::from("wide")]);
}

#[test]
fn create_both_keeps_existing_and_adds_candidate() {
    let line = ([0.0, 0.0, 0.0], [15.0, 0.0, 0.0]);
    let mut backend = MemoryBackend::with_existing(vec![("b1", beam(line.0, line.1, 2.0, 2.0))]);
    let mut resolver = FixedPolicy(ConflictResolutionAction::CreateBoth);

    let outcome = run_batch(&mut backend, &mut resolver, vec![beam(line.0, line.1, 1.0, 2.0)]);

    assert_eq!((outcome.created, outcome.replaced), (1, 0));
    assert_eq!(backend.handles(), ["b1", "created-1"]);
}

#[test]
fn retriangulated_slab_is_exact_duplicate() {
    init_tracing();
    let rectangle = [[0.0, 0.0], [30.0, 0.0], [30.0, 20.0], [0.0, 20.0]];
    let mut backend = MemoryBackend::with_existing(vec![("s1", slab(&rectangle, 10.0, 0.5))]);
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);

    // Same outline with edges split at beam lines, a hair off, 5 mm thicker
    let split = [
        [0.0, 0.0],
        [12.0, 0.0],
        [30.0, 0.0],
        [30.0, 20.0],
        [18.0, 20.0],
        [0.004, 20.0],
    ];
    let outcome = run_batch(&mut backend, &mut resolver, vec![slab(&split, 10.0, 0.5 + 5.0 * MM)]);

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.created, 0);
    assert_eq!(backend.handles(), ["s1"]);
}

#[test]
fn commit_failure_rolls_back_and_reconciles_counts() {
    init_tracing();
    let existing = beam([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 1.0, 1.0);
    let mut backend = MemoryBackend::with_existing(vec![("b1", existing)]);
    backend.fail_commit = true;
    let mut resolver = FixedPolicy(ConflictResolutionAction::Replace);
    let config = ToleranceConfig::default();

    let mut index = ExistingElementIndex::scan(&backend, &[ElementType::Beam], &config).unwrap();
    let outcome = ElementIngestionPipeline::new(&mut backend, &mut resolver, config)
        .ingest(
            &mut index,
            vec![
                beam([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], 2.0, 1.0),
                beam([0.0, 5.0, 0.0], [10.0, 5.0, 0.0], 1.0, 1.0),
            ],
        );

    assert!(!outcome.committed);
    assert_eq!((outcome.created, outcome.replaced, outcome.skipped), (0, 0, 2));
    assert!(outcome.errors.last().unwrap().contains("transaction aborted"));

    // Index and backend are back to the pre-batch state
    assert_eq!(index.len(), 1);
    assert!(index.contains(&"b1".into()));
    assert_eq!(backend.handles(), ["b1"]);
    assert!(backend.staged_creates.is_empty());
}

#[test]
fn millimetre_extraction_matches_foot_model() {
    let existing = beam([0.0, 0.0, 10.0], [20.0, 0.0, 10.0], 1.0, 2.0);
    let mut backend = MemoryBackend::with_existing(vec![("b1", existing)]);
    let mut resolver = FixedPolicy(ConflictResolutionAction::Skip);

    let candidate = beam([0.0, 0.0, 3048.0], [6096.0, 0.0, 3048.0], 304.8, 609.6)
        .normalized(LengthUnit::Millimeter);
    let outcome = run_batch(&mut backend, &mut resolver, vec![candidate]);

    assert_eq!((outcome.created, outcome.skipped), (0, 1));
}
