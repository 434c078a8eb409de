// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary ring cleanup before slab comparison.
//!
//! Two authoring tools rarely agree on the vertex count of the same slab
//! outline: one splits an edge where a beam frames in, the other
//! re-triangulates on export. Centroids of the raw vertex lists then drift
//! apart even though the outline is identical. Removing near-duplicate and
//! collinear vertices brings both rings back to their corner points.
//!
//! Both passes keep at least three points. If a pass would leave fewer, the
//! input is returned unchanged.

use nalgebra::Point3;

use crate::compare::points_close;

const MIN_RING_POINTS: usize = 3;

/// Drops points that are within `tol` (per axis) of an already-kept point.
///
/// Walks the ring in order, so the first occurrence of a cluster wins. A
/// closing vertex that repeats the first point is removed as well.
pub fn filter_close_points(points: &[Point3<f64>], tol: f64) -> Vec<Point3<f64>> {
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());

    for p in points {
        if !kept.iter().any(|k| points_close(p, k, tol)) {
            kept.push(*p);
        }
    }

    if kept.len() < MIN_RING_POINTS {
        return points.to_vec();
    }
    kept
}

/// Drops vertices whose triangle with their cyclic neighbours has an XY
/// area below `area_tol`.
///
/// Areas are measured against the original neighbours, so a run of
/// collinear vertices along one edge is removed in a single pass.
pub fn simplify_collinear(points: &[Point3<f64>], area_tol: f64) -> Vec<Point3<f64>> {
    let n = points.len();
    if n < MIN_RING_POINTS {
        return points.to_vec();
    }

    let kept: Vec<Point3<f64>> = (0..n)
        .filter(|&i| {
            let prev = &points[(i + n - 1) % n];
            let curr = &points[i];
            let next = &points[(i + 1) % n];
            triangle_area_xy(prev, curr, next) >= area_tol
        })
        .map(|i| points[i])
        .collect();

    if kept.len() < MIN_RING_POINTS {
        return points.to_vec();
    }
    kept
}

/// Near-duplicate filtering followed by collinear simplification.
pub fn prepare_boundary(points: &[Point3<f64>], tol: f64, area_tol: f64) -> Vec<Point3<f64>> {
    simplify_collinear(&filter_close_points(points, tol), area_tol)
}

#[inline]
fn triangle_area_xy(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let cross = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    cross.abs() / 2.0
}
