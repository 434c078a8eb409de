// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use crate::patterns::PatternRules;

/// Load synchronization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Registry file. Default: `.strucsync/load_registry.json`
    pub registry_path: PathBuf,

    /// Pattern name to category rules. Default: dead/live/wind/quake/snow
    pub pattern_rules: PatternRules,

    /// Errors listed in the report summary before the tail. Default: 10
    pub max_displayed_errors: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(".strucsync").join("load_registry.json"),
            pattern_rules: PatternRules::default(),
            max_displayed_errors: 10,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `STRUCSYNC_REGISTRY_PATH` and
    /// `STRUCSYNC_MAX_DISPLAYED_ERRORS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            registry_path: std::env::var_os("STRUCSYNC_REGISTRY_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            pattern_rules: defaults.pattern_rules,
            max_displayed_errors: std::env::var("STRUCSYNC_MAX_DISPLAYED_ERRORS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_displayed_errors),
        }
    }

    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }
}
