// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load assignment records, as extracted and as persisted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape of an applied load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadType {
    /// Concentrated load at a distance along a frame.
    Point,
    /// Line load between two distances along a frame.
    Distributed,
    /// Uniform pressure over an area (or full-length line load on a frame).
    Uniform,
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadType::Point => "Point",
            LoadType::Distributed => "Distributed",
            LoadType::Uniform => "Uniform",
        };
        f.write_str(name)
    }
}

/// Global direction of a force or moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadDirection {
    X,
    Y,
    Z,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "MY")]
    My,
    #[serde(rename = "MZ")]
    Mz,
}

impl LoadDirection {
    pub fn is_moment(self) -> bool {
        matches!(self, LoadDirection::Mx | LoadDirection::My | LoadDirection::Mz)
    }

    /// 0, 1, 2 for the X, Y, Z axis.
    pub fn axis(self) -> u8 {
        match self {
            LoadDirection::X | LoadDirection::Mx => 0,
            LoadDirection::Y | LoadDirection::My => 1,
            LoadDirection::Z | LoadDirection::Mz => 2,
        }
    }
}

/// Where a registry entry stands relative to the target model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SyncState {
    /// Extracted, not applied yet.
    #[default]
    Pending,
    /// Applied and matching the target model.
    Synced,
    /// Applied, then changed on the source side.
    Modified,
    /// Gone from the source model.
    Deleted,
}

/// One load applied to one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAssignment {
    pub element_id: String,
    pub pattern: String,
    pub load_type: LoadType,
    pub value: f64,
    pub unit: String,
    pub direction: LoadDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_distance: Option<f64>,
    /// Distances are fractions of the element length rather than lengths.
    #[serde(default)]
    pub relative: bool,
    pub source_platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_state: SyncState,
    /// Empty until the registry assigns one.
    #[serde(default)]
    pub unique_identifier: String,
}

impl LoadAssignment {
    pub fn new(
        element_id: impl Into<String>,
        pattern: impl Into<String>,
        load_type: LoadType,
        value: f64,
        unit: impl Into<String>,
        direction: LoadDirection,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            pattern: pattern.into(),
            load_type,
            value,
            unit: unit.into(),
            direction,
            start_distance: None,
            end_distance: None,
            relative: false,
            source_platform: String::new(),
            last_modified: None,
            sync_state: SyncState::Pending,
            unique_identifier: String::new(),
        }
    }

    pub fn with_distances(mut self, start: Option<f64>, end: Option<f64>, relative: bool) -> Self {
        self.start_distance = start;
        self.end_distance = end;
        self.relative = relative;
        self
    }

    pub fn with_source(mut self, platform: impl Into<String>) -> Self {
        self.source_platform = platform.into();
        self
    }

    pub fn with_identifier(mut self, id: impl Into<String>) -> Self {
        self.unique_identifier = id.into();
        self
    }

    /// True when both describe the same load, ignoring bookkeeping fields
    /// (timestamp, sync state, identifier).
    pub fn same_payload(&self, other: &LoadAssignment) -> bool {
        self.element_id == other.element_id
            && self.pattern == other.pattern
            && self.load_type == other.load_type
            && self.value == other.value
            && self.unit == other.unit
            && self.direction == other.direction
            && self.start_distance == other.start_distance
            && self.end_distance == other.end_distance
            && self.relative == other.relative
            && self.source_platform == other.source_platform
    }
}

impl fmt::Display for LoadAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {:?} on {} ({})",
            self.load_type, self.value, self.unit, self.direction, self.element_id, self.pattern
        )
    }
}
