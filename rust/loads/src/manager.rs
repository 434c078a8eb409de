// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load synchronization driver.
//!
//! A sync run:
//! 1. creates missing load patterns (fatal on failure)
//! 2. classifies each load against the registry and applies new or changed
//!    ones, recording per-load failures without aborting
//! 3. drops registry entries whose platform was synced but which were not
//!    seen this run
//! 4. saves the registry

use std::fmt;

use chrono::Utc;
use rustc_hash::FxHashSet;
use serde::Serialize;
use strucsync_core::cap_messages;
use tracing::{debug, info, warn};

use crate::backend::{ApplyRequest, ElementKindIndex, LoadBackend};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::model::{LoadAssignment, SyncState};
use crate::patterns::LoadPatternRegistrar;
use crate::registry::LoadSyncRegistry;

/// Counts from one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub new_loads: usize,
    pub modified_loads: usize,
    pub deleted_loads: usize,
    pub unchanged_loads: usize,
    pub total_loads: usize,
    pub failed_loads: usize,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn displayed_errors(&self, limit: usize) -> Vec<String> {
        cap_messages(&self.errors, limit)
    }

    pub fn summary(&self, limit: usize) -> String {
        let mut out = self.to_string();
        for line in self.displayed_errors(limit) {
            out.push_str("\n  ");
            out.push_str(&line);
        }
        out
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loads: {} total, {} new, {} modified, {} unchanged, {} deleted, {} failed",
            self.total_loads,
            self.new_loads,
            self.modified_loads,
            self.unchanged_loads,
            self.deleted_loads,
            self.failed_loads
        )
    }
}

enum Change {
    New,
    Modified,
    Unchanged,
}

pub struct LoadSyncManager<'a, B: LoadBackend + ?Sized> {
    backend: &'a mut B,
    registry: LoadSyncRegistry,
    registrar: LoadPatternRegistrar,
    max_displayed_errors: usize,
}

impl<'a, B: LoadBackend + ?Sized> LoadSyncManager<'a, B> {
    pub fn new(
        backend: &'a mut B,
        registry: LoadSyncRegistry,
        registrar: LoadPatternRegistrar,
    ) -> Self {
        Self {
            backend,
            registry,
            registrar,
            max_displayed_errors: 10,
        }
    }

    /// Open the configured registry and set up the registrar from `config`.
    pub fn from_config(backend: &'a mut B, config: &SyncConfig) -> Result<Self> {
        let registry = LoadSyncRegistry::load(&config.registry_path)?;
        let mut manager = Self::new(
            backend,
            registry,
            LoadPatternRegistrar::new(config.pattern_rules.clone()),
        );
        manager.max_displayed_errors = config.max_displayed_errors;
        Ok(manager)
    }

    pub fn registry(&self) -> &LoadSyncRegistry {
        &self.registry
    }

    pub fn sync(&mut self, loads: Vec<LoadAssignment>) -> Result<SyncReport> {
        let mut report = SyncReport {
            total_loads: loads.len(),
            ..Default::default()
        };

        self.registrar.ensure_patterns(&mut *self.backend, &loads)?;

        let platforms: FxHashSet<String> =
            loads.iter().map(|l| l.source_platform.clone()).collect();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let kinds = ElementKindIndex::build(&*self.backend)?;

        for mut load in loads {
            let id = self.resolve_identifier(&load, &seen);
            load.unique_identifier = id.clone();
            seen.insert(id.clone());

            let change = match self.registry.get(&id) {
                Some(previous) if previous.same_payload(&load) => Change::Unchanged,
                Some(_) => Change::Modified,
                None => Change::New,
            };
            if let Change::Unchanged = change {
                debug!(id = %id, "load unchanged");
                report.unchanged_loads += 1;
                continue;
            }

            let applied = ApplyRequest::build(&load, kinds.kind_of(&load.element_id))
                .and_then(|request| self.backend.apply_load(&request));

            match applied {
                Ok(()) => {
                    match change {
                        Change::New => report.new_loads += 1,
                        _ => report.modified_loads += 1,
                    }
                    load.sync_state = SyncState::Synced;
                    load.last_modified = Some(Utc::now());
                    self.registry.register_load(load);
                }
                Err(e) => {
                    warn!(id = %id, element = %load.element_id, error = %e, "failed to apply load");
                    report.failed_loads += 1;
                    report.errors.push(format!("{load}: {e}"));
                }
            }
        }

        let stale: Vec<String> = platforms
            .iter()
            .flat_map(|platform| self.registry.ids_for_platform(platform))
            .filter(|id| !seen.contains(id))
            .collect();
        for id in stale {
            debug!(id = %id, "load deleted at source");
            self.registry.remove(&id);
            report.deleted_loads += 1;
        }

        self.registry.save()?;

        info!(
            total = report.total_loads,
            new = report.new_loads,
            modified = report.modified_loads,
            unchanged = report.unchanged_loads,
            deleted = report.deleted_loads,
            failed = report.failed_loads,
            "load sync complete"
        );
        for line in report.displayed_errors(self.max_displayed_errors) {
            debug!("{line}");
        }
        Ok(report)
    }

    /// Explicit identifiers win. Otherwise reuse the first unclaimed registry
    /// entry for the same platform, element, pattern, type and direction, or
    /// mint a new identifier.
    fn resolve_identifier(&self, load: &LoadAssignment, claimed: &FxHashSet<String>) -> String {
        if !load.unique_identifier.is_empty() {
            return load.unique_identifier.clone();
        }
        self.registry
            .iter()
            .find(|(id, prev)| {
                !claimed.contains(*id)
                    && prev.source_platform == load.source_platform
                    && prev.element_id == load.element_id
                    && prev.pattern == load.pattern
                    && prev.load_type == load.load_type
                    && prev.direction == load.direction
            })
            .map(|(id, _)| id.to_string())
            .unwrap_or_else(|| LoadSyncRegistry::generate_identifier(load))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ElementKind;
    use crate::model::{LoadDirection, LoadType};
    use crate::patterns::LoadPatternCategory;
    use strucsync_core::{BackendError, BackendResult};

    #[derive(Default)]
    struct StubBackend {
        frames: Vec<String>,
        patterns: Vec<String>,
        applied: Vec<ApplyRequest>,
    }

    impl LoadBackend for StubBackend {
        fn pattern_names(&self) -> BackendResult<Vec<String>> {
            Ok(self.patterns.clone())
        }
        fn create_pattern(&mut self, name: &str, _: LoadPatternCategory) -> BackendResult<()> {
            self.patterns.push(name.to_string());
            Ok(())
        }
        fn frame_names(&self) -> BackendResult<Vec<String>> {
            Ok(self.frames.clone())
        }
        fn area_names(&self) -> BackendResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn apply_load(&mut self, request: &ApplyRequest) -> BackendResult<()> {
            if request.element() == "BROKEN" {
                return Err(BackendError::new("rejected"));
            }
            self.applied.push(request.clone());
            Ok(())
        }
    }

    fn beam_load(element: &str, value: f64) -> LoadAssignment {
        LoadAssignment::new(element, "DEAD", LoadType::Uniform, value, "kN/m", LoadDirection::Z)
            .with_source("revit")
    }

    fn registry_in(dir: &tempfile::TempDir) -> LoadSyncRegistry {
        LoadSyncRegistry::new(dir.path().join("registry.json"))
    }

    #[test]
    fn natural_key_reuses_identifier_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = StubBackend {
            frames: vec!["B1".into()],
            ..Default::default()
        };
        let registrar = LoadPatternRegistrar::default();
        let mut manager = LoadSyncManager::new(&mut backend, registry_in(&dir), registrar);

        let first = manager.sync(vec![beam_load("B1", -2.0)]).unwrap();
        assert_eq!(first.new_loads, 1);
        let second = manager.sync(vec![beam_load("B1", -3.0)]).unwrap();
        assert_eq!(second.modified_loads, 1);
        assert_eq!(second.new_loads, 0);
        assert_eq!(manager.registry().len(), 1);

        drop(manager);
        assert_eq!(backend.applied.len(), 2);
    }

    #[test]
    fn failed_load_keeps_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = StubBackend {
            frames: vec!["BROKEN".into()],
            ..Default::default()
        };
        let mut registry = registry_in(&dir);
        registry.register_load(beam_load("BROKEN", -1.0).with_identifier("keep"));
        let registrar = LoadPatternRegistrar::default();
        let mut manager = LoadSyncManager::new(&mut backend, registry, registrar);

        let report = manager
            .sync(vec![beam_load("BROKEN", -5.0).with_identifier("keep")])
            .unwrap();
        assert_eq!(report.failed_loads, 1);
        assert_eq!(report.deleted_loads, 0);
        assert_eq!(manager.registry().get("keep").unwrap().value, -1.0);
    }

    #[test]
    fn unknown_element_is_a_per_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = StubBackend::default();
        let registrar = LoadPatternRegistrar::default();
        let mut manager = LoadSyncManager::new(&mut backend, registry_in(&dir), registrar);

        let report = manager.sync(vec![beam_load("NOPE", -1.0)]).unwrap();
        assert_eq!(report.failed_loads, 1);
        assert!(report.errors[0].contains("not found"));
        assert!(manager.registry().is_empty());
        assert_eq!(backend.element_kind("NOPE").unwrap(), ElementKind::Unknown);
    }

    #[test]
    fn report_summary_caps_errors() {
        let report = SyncReport {
            total_loads: 4,
            failed_loads: 3,
            errors: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        let summary = report.summary(1);
        assert!(summary.starts_with("Loads: 4 total"));
        assert!(summary.contains("\n  a"));
        assert!(summary.ends_with("...and 2 more"));
    }
}
