// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Matching tolerances, with environment overrides.

use std::str::FromStr;

use strucsync_geometry::LengthUnit;

/// Tolerances used by classification, in canonical units (feet) unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceConfig {
    /// Per-axis tolerance for endpoint matching. Default: 0.01 ft (~3 mm)
    pub position: f64,

    /// Width/depth tolerance for linear elements. Default: 10 mm
    pub dimension: f64,

    /// Per-axis tolerance for slab centroids and bounding boxes. Default: 0.1 ft
    pub centroid: f64,

    /// Allowed relative slab area difference, as a fraction of the larger
    /// area. Default: 0.01 (1%)
    pub area_ratio: f64,

    /// Slab thickness tolerance. Default: 10 mm
    pub thickness: f64,

    /// Boundary vertices closer than this are merged. Default: 0.01 ft
    pub close_point: f64,

    /// Vertices forming a triangle smaller than this (ft²) with their
    /// neighbours are treated as collinear. Default: 0.01
    pub collinear_area: f64,

    /// Number of error messages shown in summaries before the
    /// "...and N more" tail. Default: 10
    pub max_displayed_errors: usize,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            position: 0.01,
            dimension: LengthUnit::Millimeter.to_canonical(10.0),
            centroid: 0.1,
            area_ratio: 0.01,
            thickness: LengthUnit::Millimeter.to_canonical(10.0),
            close_point: 0.01,
            collinear_area: 0.01,
            max_displayed_errors: 10,
        }
    }
}

impl ToleranceConfig {
    /// Defaults overridden by `STRUCSYNC_*` environment variables.
    ///
    /// Millimetre-valued variables (`*_TOL_MM`) are converted to feet.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            position: env_or("STRUCSYNC_POSITION_TOL", defaults.position),
            dimension: env_mm_or("STRUCSYNC_DIMENSION_TOL_MM", defaults.dimension),
            centroid: env_or("STRUCSYNC_CENTROID_TOL", defaults.centroid),
            area_ratio: env_or("STRUCSYNC_AREA_RATIO_TOL", defaults.area_ratio),
            thickness: env_mm_or("STRUCSYNC_THICKNESS_TOL_MM", defaults.thickness),
            close_point: env_or("STRUCSYNC_CLOSE_POINT_TOL", defaults.close_point),
            collinear_area: env_or("STRUCSYNC_COLLINEAR_AREA_TOL", defaults.collinear_area),
            max_displayed_errors: env_or(
                "STRUCSYNC_MAX_DISPLAYED_ERRORS",
                defaults.max_displayed_errors,
            ),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_mm_or(name: &str, default_ft: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|mm| LengthUnit::Millimeter.to_canonical(mm))
        .unwrap_or(default_ft)
}
