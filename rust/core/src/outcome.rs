// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch outcome counters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counts for one ingestion batch.
///
/// Only meaningful once the batch commit has been attempted: if the commit
/// failed, the counters describe the rolled-back state, not what was staged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: usize,
    pub skipped: usize,
    pub replaced: usize,
    /// Existing elements deleted without a replacement, because a replace
    /// failed and the deletion could not be cancelled.
    #[serde(default)]
    pub removed: usize,
    /// Every per-item failure message, uncapped.
    pub errors: Vec<String>,
    /// False when the final commit failed and the batch was rolled back.
    pub committed: bool,
}

impl BatchOutcome {
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Resets counters after the batch was rolled back.
    ///
    /// Nothing was created or replaced; every candidate counts as skipped.
    pub(crate) fn reconcile_rollback(&mut self, candidates: usize, reason: impl fmt::Display) {
        self.created = 0;
        self.replaced = 0;
        self.removed = 0;
        self.skipped = candidates;
        self.committed = false;
        self.errors
            .push(format!("Commit failed, batch rolled back: {}", reason));
    }

    /// Error messages for display, capped at `limit`.
    pub fn displayed_errors(&self, limit: usize) -> Vec<String> {
        cap_messages(&self.errors, limit)
    }

    /// One-line counts followed by the capped error list.
    pub fn summary(&self, limit: usize) -> String {
        let mut out = self.to_string();
        for line in self.displayed_errors(limit) {
            out.push_str("\n  ");
            out.push_str(&line);
        }
        out
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created: {}, Skipped: {}, Replaced: {}, Errors: {}",
            self.created,
            self.skipped,
            self.replaced,
            self.errors.len()
        )?;
        if self.removed > 0 {
            write!(f, ", Removed: {}", self.removed)?;
        }
        if !self.committed {
            f.write_str(" (not committed)")?;
        }
        Ok(())
    }
}

/// First `limit` messages plus an "...and N more" tail when truncated.
pub fn cap_messages(messages: &[String], limit: usize) -> Vec<String> {
    if messages.len() <= limit {
        return messages.to_vec();
    }

    let mut shown: Vec<String> = messages[..limit].to_vec();
    shown.push(format!("...and {} more", messages.len() - limit));
    shown
}
