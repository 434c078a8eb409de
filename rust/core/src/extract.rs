// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concurrent per-type extraction, joined before ingestion starts.
//!
//! Each element type is extracted on the rayon pool. The join is
//! all-or-nothing: if any extraction fails, no descriptors are returned,
//! so ingestion never sees a partial model.

use rayon::prelude::*;
use strucsync_geometry::LengthUnit;

use crate::error::{BackendResult, Error, Result};
use crate::model::{ElementDescriptor, ElementType};

/// Descriptors of one element type, in the unit the source model uses.
#[derive(Debug, Clone)]
pub struct ExtractedBatch {
    /// Declared length unit of every coordinate and dimension in the batch.
    pub unit: String,
    pub descriptors: Vec<ElementDescriptor>,
}

/// Source-model side of a reconciliation run.
pub trait Extractor: Sync {
    fn extract(&self, element_type: ElementType) -> BackendResult<ExtractedBatch>;
}

/// Extracts every type concurrently and normalizes to canonical units.
///
/// Output keeps the order of `types`, then the order within each batch.
/// Unknown units are a configuration error.
pub fn extract_all<E: Extractor + ?Sized>(
    extractor: &E,
    types: &[ElementType],
) -> Result<Vec<ElementDescriptor>> {
    let batches: Vec<(ElementType, ExtractedBatch)> = types
        .par_iter()
        .map(|&element_type| {
            extractor
                .extract(element_type)
                .map(|batch| (element_type, batch))
                .map_err(|source| Error::Extraction {
                    element_type,
                    source,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut descriptors = Vec::new();
    for (element_type, batch) in batches {
        let unit = LengthUnit::parse(&batch.unit)?;
        tracing::debug!(
            element_type = %element_type,
            count = batch.descriptors.len(),
            unit = %unit,
            "Extracted elements"
        );
        descriptors.extend(batch.descriptors.into_iter().map(|d| d.normalized(unit)));
    }

    Ok(descriptors)
}
