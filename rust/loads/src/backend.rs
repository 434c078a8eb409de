// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load backend port and apply request construction.

use rustc_hash::FxHashSet;
use strucsync_core::{BackendError, BackendResult};

use crate::error::{Error, Result};
use crate::model::{LoadAssignment, LoadDirection, LoadType};
use crate::patterns::LoadPatternCategory;

/// Offset added to the axis index to get the backend's global direction code.
const GLOBAL_DIRECTION_OFFSET: u8 = 4;

/// Kind of target element a load lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Frame,
    Area,
    Unknown,
}

/// Whether a load acts as a force or a moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Force,
    Moment,
}

impl LoadKind {
    pub fn of(direction: LoadDirection) -> Self {
        if direction.is_moment() {
            LoadKind::Moment
        } else {
            LoadKind::Force
        }
    }
}

/// Backend direction code for a load direction.
///
/// X/Y/Z map to 4/5/6 as forces; MX/MY/MZ map to the same codes as moments.
pub fn backend_direction(direction: LoadDirection) -> (u8, LoadKind) {
    (
        GLOBAL_DIRECTION_OFFSET + direction.axis(),
        LoadKind::of(direction),
    )
}

/// One backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyRequest {
    FramePoint {
        frame: String,
        pattern: String,
        kind: LoadKind,
        direction: u8,
        distance: f64,
        value: f64,
        relative: bool,
    },
    FrameDistributed {
        frame: String,
        pattern: String,
        kind: LoadKind,
        direction: u8,
        start_distance: f64,
        end_distance: f64,
        start_value: f64,
        end_value: f64,
        relative: bool,
    },
    AreaUniform {
        area: String,
        pattern: String,
        direction: u8,
        value: f64,
    },
}

impl ApplyRequest {
    /// Build the backend call for `load` on an element of `kind`.
    ///
    /// Point loads without a distance sit at mid-span. Uniform loads on
    /// frames become distributed loads over the span from [`frame_span`].
    pub fn build(load: &LoadAssignment, kind: ElementKind) -> BackendResult<Self> {
        let (direction, load_kind) = backend_direction(load.direction);
        match (kind, load.load_type) {
            (ElementKind::Unknown, _) => Err(BackendError::new(format!(
                "element {} not found in target model",
                load.element_id
            ))),
            (ElementKind::Frame, LoadType::Point) => Ok(ApplyRequest::FramePoint {
                frame: load.element_id.clone(),
                pattern: load.pattern.clone(),
                kind: load_kind,
                direction,
                distance: load.start_distance.unwrap_or(0.5),
                value: load.value,
                relative: load.start_distance.is_none() || load.relative,
            }),
            (ElementKind::Frame, LoadType::Distributed | LoadType::Uniform) => {
                let span = frame_span(load.start_distance, load.end_distance, load.relative);
                let Some((start_distance, end_distance, relative)) = span else {
                    return Err(BackendError::new(format!(
                        "{} load on {} has an incomplete or reversed span",
                        load.load_type, load.element_id
                    )));
                };
                Ok(ApplyRequest::FrameDistributed {
                    frame: load.element_id.clone(),
                    pattern: load.pattern.clone(),
                    kind: load_kind,
                    direction,
                    start_distance,
                    end_distance,
                    start_value: load.value,
                    end_value: load.value,
                    relative,
                })
            }
            (ElementKind::Area, LoadType::Uniform) if !load.direction.is_moment() => {
                Ok(ApplyRequest::AreaUniform {
                    area: load.element_id.clone(),
                    pattern: load.pattern.clone(),
                    direction,
                    value: load.value,
                })
            }
            (ElementKind::Area, _) => Err(BackendError::new(format!(
                "{} {:?} load cannot be applied to area {}",
                load.load_type, load.direction, load.element_id
            ))),
        }
    }

    pub fn element(&self) -> &str {
        match self {
            ApplyRequest::FramePoint { frame, .. } => frame,
            ApplyRequest::FrameDistributed { frame, .. } => frame,
            ApplyRequest::AreaUniform { area, .. } => area,
        }
    }
}

/// Loaded span of a frame load as `(start, end, relative)`.
///
/// No distances means the full length. A relative span defaults a missing end
/// to 0 or 1; an absolute span needs both ends. `None` for an absolute span
/// with one end missing, or for any span that runs backwards.
pub fn frame_span(
    start: Option<f64>,
    end: Option<f64>,
    relative: bool,
) -> Option<(f64, f64, bool)> {
    let (start, end, relative) = match (start, end) {
        (None, None) => (0.0, 1.0, true),
        (Some(start), Some(end)) => (start, end, relative),
        (start, end) if relative => (start.unwrap_or(0.0), end.unwrap_or(1.0), true),
        _ => return None,
    };
    (start <= end).then_some((start, end, relative))
}

/// Target model API for load synchronization.
pub trait LoadBackend {
    fn pattern_names(&self) -> BackendResult<Vec<String>>;

    fn pattern_exists(&self, name: &str) -> BackendResult<bool> {
        Ok(self.pattern_names()?.iter().any(|p| p == name))
    }

    fn create_pattern(&mut self, name: &str, category: LoadPatternCategory) -> BackendResult<()>;

    fn frame_names(&self) -> BackendResult<Vec<String>>;

    fn area_names(&self) -> BackendResult<Vec<String>>;

    fn element_kind(&self, id: &str) -> BackendResult<ElementKind> {
        if self.frame_names()?.iter().any(|n| n == id) {
            Ok(ElementKind::Frame)
        } else if self.area_names()?.iter().any(|n| n == id) {
            Ok(ElementKind::Area)
        } else {
            Ok(ElementKind::Unknown)
        }
    }

    fn apply_load(&mut self, request: &ApplyRequest) -> BackendResult<()>;
}

/// Frame and area names, read once per sync.
#[derive(Debug, Default, Clone)]
pub struct ElementKindIndex {
    frames: FxHashSet<String>,
    areas: FxHashSet<String>,
}

impl ElementKindIndex {
    pub fn build<B: LoadBackend + ?Sized>(backend: &B) -> Result<Self> {
        let frames = backend.frame_names().map_err(Error::ElementQuery)?;
        let areas = backend.area_names().map_err(Error::ElementQuery)?;
        Ok(Self {
            frames: frames.into_iter().collect(),
            areas: areas.into_iter().collect(),
        })
    }

    /// Frames win when a name is both.
    pub fn kind_of(&self, id: &str) -> ElementKind {
        if self.frames.contains(id) {
            ElementKind::Frame
        } else if self.areas.contains(id) {
            ElementKind::Area
        } else {
            ElementKind::Unknown
        }
    }
}
