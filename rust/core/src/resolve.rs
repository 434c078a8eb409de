// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conflict resolution port.
//!
//! The pipeline blocks on [`ConflictResolver::resolve`] until a decision is
//! returned. Implementations may prompt a human, show a dialog, or apply a
//! fixed policy.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::index::IndexEntry;
use crate::model::ElementDescriptor;

/// What to do with a candidate that conflicts with existing elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictResolutionAction {
    /// Discard the candidate, leave existing elements untouched.
    Skip,
    /// Delete every conflicting element, then create the candidate.
    Replace,
    /// Create the candidate next to the existing elements.
    CreateBoth,
}

/// Decides how a location conflict is handled.
pub trait ConflictResolver {
    fn resolve(
        &mut self,
        candidate: &ElementDescriptor,
        conflicts: &[IndexEntry],
    ) -> ConflictResolutionAction;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&ElementDescriptor, &[IndexEntry]) -> ConflictResolutionAction,
{
    fn resolve(
        &mut self,
        candidate: &ElementDescriptor,
        conflicts: &[IndexEntry],
    ) -> ConflictResolutionAction {
        self(candidate, conflicts)
    }
}

/// Applies the same action to every conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPolicy(pub ConflictResolutionAction);

impl ConflictResolver for FixedPolicy {
    fn resolve(&mut self, _: &ElementDescriptor, _: &[IndexEntry]) -> ConflictResolutionAction {
        self.0
    }
}

/// Replays a queue of decisions, then falls back to a default.
#[derive(Debug, Clone)]
pub struct ScriptedResolver {
    decisions: VecDeque<ConflictResolutionAction>,
    fallback: ConflictResolutionAction,
    asked: usize,
}

impl ScriptedResolver {
    pub fn new(
        decisions: impl IntoIterator<Item = ConflictResolutionAction>,
        fallback: ConflictResolutionAction,
    ) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            fallback,
            asked: 0,
        }
    }

    /// How many conflicts were presented so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl ConflictResolver for ScriptedResolver {
    fn resolve(&mut self, _: &ElementDescriptor, _: &[IndexEntry]) -> ConflictResolutionAction {
        self.asked += 1;
        self.decisions.pop_front().unwrap_or(self.fallback)
    }
}
