// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate classification of a candidate against the existing index.
//!
//! Classification has no side effects: the same candidate against the same
//! index always produces the same answer. Entries are scanned in insertion
//! order and the first exact duplicate wins, even if earlier entries were
//! location conflicts.

use strucsync_geometry::{bounding_boxes_similar, points_close, segments_match};

use crate::config::ToleranceConfig;
use crate::index::{ExistingElementIndex, IndexEntry, SlabSignature};
use crate::model::{
    ElementDescriptor, ElementHandle, LinearElementDescriptor, PolygonElementDescriptor,
};

/// Result of classifying one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Same location and same dimensions as this existing element.
    ExactDuplicate(ElementHandle),
    /// Same location as these elements, but different dimensions.
    LocationConflict(Vec<IndexEntry>),
    /// Nothing at this location.
    New,
}

impl Classification {
    pub fn is_exact_duplicate(&self) -> bool {
        matches!(self, Classification::ExactDuplicate(_))
    }

    /// Conflicting entries; empty unless this is a location conflict.
    pub fn conflicting(&self) -> &[IndexEntry] {
        match self {
            Classification::LocationConflict(entries) => entries,
            _ => &[],
        }
    }
}

/// Tolerance-based duplicate detection.
#[derive(Debug, Clone, Default)]
pub struct DuplicateClassifier {
    config: ToleranceConfig,
}

impl DuplicateClassifier {
    pub fn new(config: ToleranceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToleranceConfig {
        &self.config
    }

    /// Classifies `candidate` against entries of the same element type.
    pub fn classify(
        &self,
        candidate: &ElementDescriptor,
        index: &ExistingElementIndex,
    ) -> Classification {
        let existing = index.entries(candidate.element_type());
        match candidate {
            ElementDescriptor::Linear(linear) => self.classify_linear(linear, existing),
            ElementDescriptor::Polygon(polygon) => self.classify_polygon(polygon, existing),
        }
    }

    fn classify_linear(
        &self,
        candidate: &LinearElementDescriptor,
        existing: &[IndexEntry],
    ) -> Classification {
        let tol = &self.config;
        let mut conflicts = Vec::new();

        for entry in existing {
            let ElementDescriptor::Linear(other) = &entry.descriptor else {
                continue;
            };

            let same_segment = segments_match(
                &candidate.start,
                &candidate.end,
                &other.start,
                &other.end,
                tol.position,
            );
            if !same_segment {
                continue;
            }

            let same_width = (candidate.width - other.width).abs() < tol.dimension;
            let same_depth = (candidate.depth - other.depth).abs() < tol.dimension;
            if same_width && same_depth {
                return Classification::ExactDuplicate(entry.handle.clone());
            }
            conflicts.push(entry.clone());
        }

        if conflicts.is_empty() {
            Classification::New
        } else {
            Classification::LocationConflict(conflicts)
        }
    }

    fn classify_polygon(
        &self,
        candidate: &PolygonElementDescriptor,
        existing: &[IndexEntry],
    ) -> Classification {
        let signature = SlabSignature::from_boundary(&candidate.boundary, &self.config);
        let mut conflicts = Vec::new();

        for entry in existing {
            let ElementDescriptor::Polygon(other) = &entry.descriptor else {
                continue;
            };

            let matched = match &entry.signature {
                Some(stored) => self.slab_geometry_matches(&signature, stored),
                None => {
                    let stored = SlabSignature::from_boundary(&other.boundary, &self.config);
                    self.slab_geometry_matches(&signature, &stored)
                }
            };
            if !matched {
                continue;
            }

            if (candidate.thickness - other.thickness).abs() < self.config.thickness {
                return Classification::ExactDuplicate(entry.handle.clone());
            }
            conflicts.push(entry.clone());
        }

        if conflicts.is_empty() {
            Classification::New
        } else {
            Classification::LocationConflict(conflicts)
        }
    }

    fn slab_geometry_matches(&self, a: &SlabSignature, b: &SlabSignature) -> bool {
        let tol = &self.config;
        let centroid_close = points_close(&a.centroid, &b.centroid, tol.centroid);
        let area_close = (a.area - b.area).abs() <= tol.area_ratio * a.area.max(b.area);
        let bounds_close = bounding_boxes_similar(&a.bounds, &b.bounds, tol.centroid);
        centroid_close && area_close && bounds_close
    }
}
