// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Index of elements already present in the target model.
//!
//! Built once per batch from the backend, then kept current by the pipeline:
//! created elements are appended before the next candidate is classified,
//! replaced elements are removed. Entries keep insertion order per element
//! type, and that order is the classifier's scan order.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use strucsync_geometry::{bounding_box, centroid, polygon_area, prepare_boundary, BoundingBox};

use crate::backend::ElementBackend;
use crate::config::ToleranceConfig;
use crate::error::{Error, Result};
use crate::model::{ElementDescriptor, ElementHandle, ElementType};

/// Comparison data for a slab outline, computed after boundary cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct SlabSignature {
    /// Outline after near-duplicate and collinear vertex removal.
    pub boundary: Vec<Point3<f64>>,
    pub centroid: Point3<f64>,
    pub area: f64,
    pub bounds: BoundingBox,
}

impl SlabSignature {
    /// Cleans the outline and measures it.
    ///
    /// Outlines with fewer than three points are measured as given; the
    /// cleanup passes leave them untouched and the area comes out as zero.
    pub fn from_boundary(points: &[Point3<f64>], config: &ToleranceConfig) -> Self {
        if points.len() < 3 {
            tracing::debug!(
                points = points.len(),
                "Degenerate slab outline, skipping boundary cleanup"
            );
        }

        let boundary = prepare_boundary(points, config.close_point, config.collinear_area);
        Self {
            centroid: centroid(&boundary),
            area: polygon_area(&boundary),
            bounds: bounding_box(&boundary),
            boundary,
        }
    }
}

/// An element known to exist in the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub handle: ElementHandle,
    pub descriptor: ElementDescriptor,
    /// Present for slabs only.
    pub signature: Option<SlabSignature>,
}

/// Per-type collection of existing elements.
#[derive(Debug, Clone)]
pub struct ExistingElementIndex {
    entries: FxHashMap<ElementType, Vec<IndexEntry>>,
    config: ToleranceConfig,
}

impl ExistingElementIndex {
    /// Create an empty index.
    pub fn new(config: &ToleranceConfig) -> Self {
        Self {
            entries: FxHashMap::default(),
            config: config.clone(),
        }
    }

    /// Queries the backend once per requested element type.
    ///
    /// Types are scanned in the given order; duplicates are ignored.
    pub fn scan<B: ElementBackend + ?Sized>(
        backend: &B,
        types: &[ElementType],
        config: &ToleranceConfig,
    ) -> Result<Self> {
        let mut index = Self::new(config);

        for &element_type in types {
            if index.entries.contains_key(&element_type) {
                continue;
            }
            index.entries.insert(element_type, Vec::new());

            let existing = backend
                .find_existing(element_type)
                .map_err(|source| Error::Scan {
                    element_type,
                    source,
                })?;

            let count = existing.len();
            for (descriptor, handle) in existing {
                index.insert(handle, descriptor);
            }
            tracing::debug!(element_type = %element_type, count, "Indexed existing elements");
        }

        Ok(index)
    }

    /// Appends an element. Slab signatures are computed here, once.
    pub fn insert(&mut self, handle: ElementHandle, descriptor: ElementDescriptor) {
        let signature = match &descriptor {
            ElementDescriptor::Polygon(polygon) => {
                Some(SlabSignature::from_boundary(&polygon.boundary, &self.config))
            }
            ElementDescriptor::Linear(_) => None,
        };

        self.entries
            .entry(descriptor.element_type())
            .or_default()
            .push(IndexEntry {
                handle,
                descriptor,
                signature,
            });
    }

    /// Removes an element by handle, keeping the order of the others.
    pub fn remove(&mut self, handle: &ElementHandle) -> Option<IndexEntry> {
        for list in self.entries.values_mut() {
            if let Some(pos) = list.iter().position(|e| &e.handle == handle) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    /// Entries of one element type, in insertion order.
    pub fn entries(&self, element_type: ElementType) -> &[IndexEntry] {
        self.entries
            .get(&element_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, handle: &ElementHandle) -> bool {
        self.entries
            .values()
            .any(|list| list.iter().any(|e| &e.handle == handle))
    }

    /// Total number of indexed elements.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
