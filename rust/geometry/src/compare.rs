// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-based geometric predicates.
//!
//! All functions are pure and deterministic. Proximity is tested per axis
//! (a box around the point), not by Euclidean distance. Degenerate inputs
//! (empty lists, fewer than three polygon points) return zero or empty
//! values instead of failing.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Zero-size box at the origin, used for empty point lists.
    pub fn empty() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// True when every axis differs by strictly less than `tol`.
#[inline]
pub fn points_close(p: &Point3<f64>, q: &Point3<f64>, tol: f64) -> bool {
    (p.x - q.x).abs() < tol && (p.y - q.y).abs() < tol && (p.z - q.z).abs() < tol
}

/// Compares two segments regardless of drawing direction.
///
/// Matches start↔start and end↔end, or start↔end and end↔start.
pub fn segments_match(
    s1: &Point3<f64>,
    e1: &Point3<f64>,
    s2: &Point3<f64>,
    e2: &Point3<f64>,
    tol: f64,
) -> bool {
    let same_direction = points_close(s1, s2, tol) && points_close(e1, e2, tol);
    let reversed = points_close(s1, e2, tol) && points_close(e1, s2, tol);
    same_direction || reversed
}

/// Arithmetic mean of the points; the origin for an empty list.
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }

    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Unsigned polygon area on the XY projection (shoelace formula).
///
/// Returns 0 for fewer than 3 points.
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }

    (twice_area / 2.0).abs()
}

/// Axis-aligned bounds of the points; [`BoundingBox::empty`] for an empty list.
pub fn bounding_box(points: &[Point3<f64>]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::empty();
    };

    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    BoundingBox { min, max }
}

/// True when both the min and max corners are close.
#[inline]
pub fn bounding_boxes_similar(a: &BoundingBox, b: &BoundingBox, tol: f64) -> bool {
    points_close(&a.min, &b.min, tol) && points_close(&a.max, &b.max, tol)
}
