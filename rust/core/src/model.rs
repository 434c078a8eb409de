// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element descriptors exchanged with extraction components and backends.

use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use strucsync_geometry::LengthUnit;

/// Structural element categories handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Beam,
    Column,
    Wall,
    Slab,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Beam => "beam",
            ElementType::Column => "column",
            ElementType::Wall => "wall",
            ElementType::Slab => "slab",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier of an element inside a backend model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Beam, column or wall described by its centre line and section size.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearElementDescriptor {
    pub element_type: ElementType,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub width: f64,
    pub depth: f64,
    /// Section or family name, passed through to the backend.
    pub section: Option<String>,
}

impl LinearElementDescriptor {
    pub fn new(
        element_type: ElementType,
        start: Point3<f64>,
        end: Point3<f64>,
        width: f64,
        depth: f64,
    ) -> Self {
        Self {
            element_type,
            start,
            end,
            width,
            depth,
            section: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Centre-line length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Slab described by its outer boundary, openings and thickness.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonElementDescriptor {
    pub boundary: Vec<Point3<f64>>,
    pub openings: Vec<Vec<Point3<f64>>>,
    pub thickness: f64,
}

impl PolygonElementDescriptor {
    pub fn new(boundary: Vec<Point3<f64>>, thickness: f64) -> Self {
        Self {
            boundary,
            openings: Vec::new(),
            thickness,
        }
    }

    pub fn with_opening(mut self, opening: Vec<Point3<f64>>) -> Self {
        self.openings.push(opening);
        self
    }
}

/// Any element the engine can reconcile.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementDescriptor {
    Linear(LinearElementDescriptor),
    Polygon(PolygonElementDescriptor),
}

impl ElementDescriptor {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementDescriptor::Linear(linear) => linear.element_type,
            ElementDescriptor::Polygon(_) => ElementType::Slab,
        }
    }

    /// Rescales every coordinate and dimension from `unit` into feet.
    pub fn normalized(self, unit: LengthUnit) -> Self {
        let f = unit.canonical_factor();
        let scale = |p: Point3<f64>| Point3::from(p.coords * f);

        match self {
            ElementDescriptor::Linear(linear) => ElementDescriptor::Linear(LinearElementDescriptor {
                start: scale(linear.start),
                end: scale(linear.end),
                width: linear.width * f,
                depth: linear.depth * f,
                ..linear
            }),
            ElementDescriptor::Polygon(polygon) => {
                ElementDescriptor::Polygon(PolygonElementDescriptor {
                    boundary: polygon.boundary.into_iter().map(scale).collect(),
                    openings: polygon
                        .openings
                        .into_iter()
                        .map(|ring| ring.into_iter().map(scale).collect())
                        .collect(),
                    thickness: polygon.thickness * f,
                })
            }
        }
    }
}

impl From<LinearElementDescriptor> for ElementDescriptor {
    fn from(linear: LinearElementDescriptor) -> Self {
        ElementDescriptor::Linear(linear)
    }
}

impl From<PolygonElementDescriptor> for ElementDescriptor {
    fn from(polygon: PolygonElementDescriptor) -> Self {
        ElementDescriptor::Polygon(polygon)
    }
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementDescriptor::Linear(l) => write!(
                f,
                "{} ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
                l.element_type, l.start.x, l.start.y, l.start.z, l.end.x, l.end.y, l.end.z
            ),
            ElementDescriptor::Polygon(p) => {
                write!(f, "slab with {} boundary points", p.boundary.len())?;
                if let Some(first) = p.boundary.first() {
                    write!(f, " at ({:.3}, {:.3}, {:.3})", first.x, first.y, first.z)?;
                }
                Ok(())
            }
        }
    }
}
