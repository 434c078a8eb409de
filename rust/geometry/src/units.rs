// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit normalization
//!
//! Every coordinate and dimension is converted into the canonical unit
//! (feet) before any comparison. Each unit maps to exactly one constant
//! factor, so converting the same value twice always yields the same
//! result, whatever path the value took to get here.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Unit all geometric computation is normalized into.
pub const CANONICAL_UNIT: LengthUnit = LengthUnit::Foot;

const FEET_PER_MILLIMETER: f64 = 1.0 / 304.8;
const FEET_PER_CENTIMETER: f64 = 1.0 / 30.48;
const FEET_PER_METER: f64 = 1.0 / 0.3048;
const FEET_PER_INCH: f64 = 1.0 / 12.0;

/// Length units accepted from extraction components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Foot,
}

impl LengthUnit {
    /// Multiplier converting a value in this unit into feet.
    #[inline]
    pub fn canonical_factor(self) -> f64 {
        match self {
            LengthUnit::Millimeter => FEET_PER_MILLIMETER,
            LengthUnit::Centimeter => FEET_PER_CENTIMETER,
            LengthUnit::Meter => FEET_PER_METER,
            LengthUnit::Inch => FEET_PER_INCH,
            LengthUnit::Foot => 1.0,
        }
    }

    /// Converts a length in this unit into the canonical unit.
    #[inline]
    pub fn to_canonical(self, value: f64) -> f64 {
        value * self.canonical_factor()
    }

    /// Converts a canonical length back into this unit.
    #[inline]
    pub fn from_canonical(self, value: f64) -> f64 {
        value / self.canonical_factor()
    }

    /// Short symbol, as written in extraction payloads.
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
        }
    }

    /// Parses a unit name, case-insensitively.
    ///
    /// Fails with [`Error::UnknownUnit`] for anything not in the table;
    /// there is no silent fallback to the canonical unit.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(LengthUnit::Millimeter)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(LengthUnit::Centimeter)
            }
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meter),
            "in" | "inch" | "inches" | "\"" => Ok(LengthUnit::Inch),
            "ft" | "foot" | "feet" | "'" => Ok(LengthUnit::Foot),
            _ => Err(Error::UnknownUnit(name.to_string())),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts `value` expressed in `unit` into the canonical unit.
pub fn normalize_length(value: f64, unit: &str) -> Result<f64> {
    Ok(LengthUnit::parse(unit)?.to_canonical(value))
}
