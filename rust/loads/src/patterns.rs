// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load pattern categorization and on-demand creation.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::LoadBackend;
use crate::error::{Error, Result};
use crate::model::LoadAssignment;

/// Load pattern category understood by the target model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadPatternCategory {
    Dead,
    Live,
    Wind,
    Quake,
    Snow,
    Other,
}

impl LoadPatternCategory {
    /// Numeric category code used by the backend.
    pub fn backend_code(self) -> u8 {
        match self {
            LoadPatternCategory::Dead => 1,
            LoadPatternCategory::Live => 3,
            LoadPatternCategory::Quake => 5,
            LoadPatternCategory::Wind => 6,
            LoadPatternCategory::Snow => 7,
            LoadPatternCategory::Other => 8,
        }
    }
}

/// Ordered substring rules mapping pattern names to categories.
///
/// Matching is case-insensitive; the first rule whose keyword occurs in the
/// name wins. Names matching nothing are [`LoadPatternCategory::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRules {
    rules: Vec<(String, LoadPatternCategory)>,
}

impl Default for PatternRules {
    fn default() -> Self {
        Self::new([
            ("dead", LoadPatternCategory::Dead),
            ("live", LoadPatternCategory::Live),
            ("wind", LoadPatternCategory::Wind),
            ("quake", LoadPatternCategory::Quake),
            ("seismic", LoadPatternCategory::Quake),
            ("snow", LoadPatternCategory::Snow),
        ])
    }
}

impl PatternRules {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, LoadPatternCategory)>,
        S: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(k, c)| (k.into().to_lowercase(), c))
                .collect(),
        }
    }

    /// Append a rule with lower precedence than the existing ones.
    pub fn push(&mut self, keyword: impl Into<String>, category: LoadPatternCategory) {
        self.rules.push((keyword.into().to_lowercase(), category));
    }

    pub fn categorize(&self, name: &str) -> LoadPatternCategory {
        let lower = name.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, category)| *category)
            .unwrap_or(LoadPatternCategory::Other)
    }
}

/// Makes sure every pattern a batch of loads references exists.
#[derive(Debug, Clone, Default)]
pub struct LoadPatternRegistrar {
    rules: PatternRules,
}

impl LoadPatternRegistrar {
    pub fn new(rules: PatternRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PatternRules {
        &self.rules
    }

    /// Create the missing patterns referenced by `loads`, in first-seen
    /// order. Returns the names that were created.
    ///
    /// Any creation failure aborts: no load may be applied against a
    /// pattern that does not exist.
    pub fn ensure_patterns<B: LoadBackend + ?Sized>(
        &self,
        backend: &mut B,
        loads: &[LoadAssignment],
    ) -> Result<Vec<String>> {
        let mut seen = FxHashSet::default();
        let referenced: Vec<&str> = loads
            .iter()
            .map(|l| l.pattern.as_str())
            .filter(|p| seen.insert(*p))
            .collect();

        let existing: FxHashSet<String> = backend
            .pattern_names()
            .map_err(Error::PatternQuery)?
            .into_iter()
            .collect();

        let mut created = Vec::new();
        for name in referenced {
            if existing.contains(name) {
                continue;
            }
            let category = self.rules.categorize(name);
            debug!(pattern = name, ?category, "creating load pattern");
            backend
                .create_pattern(name, category)
                .map_err(|source| Error::UnresolvedPattern {
                    name: name.to_string(),
                    source,
                })?;
            created.push(name.to_string());
        }

        if !created.is_empty() {
            info!(count = created.len(), patterns = ?created, "created load patterns");
        }
        Ok(created)
    }
}
