// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StrucSync Geometry
//!
//! Pure, deterministic geometry used to decide whether two structural
//! elements coming from different authoring tools are "the same thing".
//!
//! - [`units`]: fixed-factor length conversion into the canonical unit (feet)
//! - [`compare`]: tolerance predicates (point proximity, segment match,
//!   centroid, shoelace area, bounding boxes)
//! - [`boundary`]: slab boundary cleanup (near-duplicate and collinear
//!   vertex removal) so re-triangulated outlines compare equal
//!
//! Nothing in this crate fails on malformed geometry: degenerate inputs
//! produce zero/empty results so a single bad element never aborts a batch.
//! The only error is an unrecognized length unit.

pub mod boundary;
pub mod compare;
pub mod error;
pub mod units;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use boundary::{filter_close_points, prepare_boundary, simplify_collinear};
pub use compare::{
    bounding_box, bounding_boxes_similar, centroid, points_close, polygon_area, segments_match,
    BoundingBox,
};
pub use error::{Error, Result};
pub use units::{normalize_length, LengthUnit, CANONICAL_UNIT};
