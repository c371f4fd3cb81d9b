//! Area-unit normalization and price arithmetic.
//!
//! All functions are plain floating-point arithmetic. Nothing is rounded
//! here; rounding for display belongs to the caller so repeated conversions
//! do not drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Returned by [`price_per_sqft`] when the area is zero or negative.
///
/// The largest finite `f64`, so degenerate listings still sort after every
/// real price.
pub const PRICE_UNDEFINED: f64 = f64::MAX;

// ---------------------------------------------------------------------------
// Conversion factors (square feet per unit)
// ---------------------------------------------------------------------------

pub const SQFT_PER_SQFT: f64 = 1.0;
pub const SQFT_PER_SQ_YARD: f64 = 9.0;
pub const SQFT_PER_SQ_METER: f64 = 10.7639;
pub const SQFT_PER_ACRE: f64 = 43560.0;
pub const SQFT_PER_HECTARE: f64 = 107639.0;

/// Supported area measurement units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaUnit {
    #[serde(rename = "Sqft")]
    Sqft,
    #[serde(rename = "Sq Yards")]
    SqYards,
    #[serde(rename = "Sq Meters")]
    SqMeters,
    #[serde(rename = "Acres")]
    Acres,
    #[serde(rename = "Hectares")]
    Hectares,
}

impl AreaUnit {
    pub const ALL: [AreaUnit; 5] = [
        AreaUnit::Sqft,
        AreaUnit::SqYards,
        AreaUnit::SqMeters,
        AreaUnit::Acres,
        AreaUnit::Hectares,
    ];

    /// Square feet in one unit.
    pub fn sqft_factor(self) -> f64 {
        match self {
            AreaUnit::Sqft => SQFT_PER_SQFT,
            AreaUnit::SqYards => SQFT_PER_SQ_YARD,
            AreaUnit::SqMeters => SQFT_PER_SQ_METER,
            AreaUnit::Acres => SQFT_PER_ACRE,
            AreaUnit::Hectares => SQFT_PER_HECTARE,
        }
    }

    /// Display name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            AreaUnit::Sqft => "Sqft",
            AreaUnit::SqYards => "Sq Yards",
            AreaUnit::SqMeters => "Sq Meters",
            AreaUnit::Acres => "Acres",
            AreaUnit::Hectares => "Hectares",
        }
    }

    /// Short suffix used after a magnitude ("1200 sqft", "2 acre").
    pub fn short_label(self) -> &'static str {
        match self {
            AreaUnit::Sqft => "sqft",
            AreaUnit::SqYards => "sqyd",
            AreaUnit::SqMeters => "sqmtr",
            AreaUnit::Acres => "acre",
            AreaUnit::Hectares => "hectare",
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AreaUnit::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown area unit: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn to_square_feet(value: f64, unit: AreaUnit) -> f64 {
    value * unit.sqft_factor()
}

/// Exact inverse of [`to_square_feet`].
pub fn from_square_feet(value_in_sqft: f64, unit: AreaUnit) -> f64 {
    value_in_sqft / unit.sqft_factor()
}

pub fn convert_area(value: f64, from: AreaUnit, to: AreaUnit) -> f64 {
    from_square_feet(to_square_feet(value, from), to)
}

/// Price per square foot -> price per `target_unit`.
///
/// Uses the same multiplier as [`to_square_feet`]: a larger unit costs
/// proportionally more.
pub fn convert_price_per_unit(price_per_sqft: f64, target_unit: AreaUnit) -> f64 {
    price_per_sqft * target_unit.sqft_factor()
}

/// Price per `unit` -> price per square foot. Inverse of [`convert_price_per_unit`].
pub fn price_per_sqft_from_unit(price_per_unit: f64, unit: AreaUnit) -> f64 {
    price_per_unit / unit.sqft_factor()
}

/// Total price from a per-unit price and an area measured in that same unit.
pub fn derived_total(price_per_unit: f64, area_in_same_unit: f64) -> f64 {
    price_per_unit * area_in_same_unit
}

/// Total price divided by area, or [`PRICE_UNDEFINED`] unless `area_in_sqft`
/// is a positive number.
pub fn price_per_sqft(total_price: f64, area_in_sqft: f64) -> f64 {
    if area_in_sqft.is_nan() || area_in_sqft <= 0.0 {
        return PRICE_UNDEFINED;
    }
    total_price / area_in_sqft
}

// ---------------------------------------------------------------------------
// Display helper
// ---------------------------------------------------------------------------

/// Area and price of one listing expressed in a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaDisplay {
    pub unit: AreaUnit,
    pub unit_label: &'static str,
    pub area: f64,
    /// `None` when the area is not positive.
    pub price_per_unit: Option<f64>,
    pub total_price: f64,
}

/// Express a listing's area (given in square feet) and total price in `unit`.
pub fn display_in(area_sqft: f64, total_price: f64, unit: AreaUnit) -> AreaDisplay {
    let per_sqft = price_per_sqft(total_price, area_sqft);
    let price_per_unit = (per_sqft != PRICE_UNDEFINED).then(|| convert_price_per_unit(per_sqft, unit));

    AreaDisplay {
        unit,
        unit_label: unit.short_label(),
        area: from_square_feet(area_sqft, unit),
        price_per_unit,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-9
    }

    #[test]
    fn factors_match_reference_constants() {
        assert_eq!(AreaUnit::Sqft.sqft_factor(), 1.0);
        assert_eq!(AreaUnit::SqYards.sqft_factor(), 9.0);
        assert_eq!(AreaUnit::SqMeters.sqft_factor(), 10.7639);
        assert_eq!(AreaUnit::Acres.sqft_factor(), 43560.0);
        assert_eq!(AreaUnit::Hectares.sqft_factor(), 107639.0);
    }

    #[test]
    fn sqft_round_trip_for_every_unit() {
        for unit in AreaUnit::ALL {
            for v in [0.001, 1.0, 3.5, 1200.0, 987_654.321] {
                let back = from_square_feet(to_square_feet(v, unit), unit);
                assert!(close(back, v), "{unit}: {v} came back as {back}");
            }
        }
    }

    #[test]
    fn convert_area_between_units() {
        assert!(close(convert_area(1.0, AreaUnit::Acres, AreaUnit::Sqft), 43560.0));
        assert!(close(convert_area(900.0, AreaUnit::Sqft, AreaUnit::SqYards), 100.0));
        assert!(close(
            convert_area(1.0, AreaUnit::Hectares, AreaUnit::SqMeters),
            107639.0 / 10.7639
        ));
    }

    #[test]
    fn price_per_acre_scales_up() {
        assert_eq!(convert_price_per_unit(100.0, AreaUnit::Acres), 4_356_000.0);
        assert_eq!(convert_price_per_unit(100.0, AreaUnit::Sqft), 100.0);
    }

    #[test]
    fn price_per_unit_round_trip() {
        for unit in AreaUnit::ALL {
            let per_unit = convert_price_per_unit(4000.0, unit);
            assert!(close(price_per_sqft_from_unit(per_unit, unit), 4000.0));
        }
    }

    #[test]
    fn derived_total_multiplies() {
        assert_eq!(derived_total(4000.0, 1200.0), 4_800_000.0);
    }

    #[test]
    fn price_per_sqft_divides() {
        assert_eq!(price_per_sqft(4_800_000.0, 1200.0), 4000.0);
    }

    #[test]
    fn zero_area_returns_sentinel() {
        let p = price_per_sqft(1000.0, 0.0);
        assert_eq!(p, PRICE_UNDEFINED);
        assert!(p.is_finite());
        assert_eq!(price_per_sqft(1000.0, -5.0), PRICE_UNDEFINED);
    }

    #[test]
    fn nan_area_returns_sentinel() {
        assert_eq!(price_per_sqft(1000.0, f64::NAN), PRICE_UNDEFINED);
        let shown = display_in(f64::NAN, 1000.0, AreaUnit::Acres);
        assert_eq!(shown.price_per_unit, None);
    }

    #[test]
    fn no_rounding_inside_conversions() {
        let sqm = from_square_feet(1000.0, AreaUnit::SqMeters);
        assert!(sqm.fract() != 0.0);
    }

    #[test]
    fn unit_names_parse_and_serialize() {
        for unit in AreaUnit::ALL {
            assert_eq!(unit.as_str().parse::<AreaUnit>().unwrap(), unit);
            assert_eq!(
                serde_json::to_value(unit).unwrap(),
                serde_json::json!(unit.as_str())
            );
        }
        assert_matches!("Bighas".parse::<AreaUnit>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn display_in_acres() {
        let d = display_in(43560.0, 4_356_000.0, AreaUnit::Acres);
        assert_eq!(d.area, 1.0);
        assert_eq!(d.price_per_unit, Some(4_356_000.0));
        assert_eq!(d.unit_label, "acre");
    }

    #[test]
    fn display_with_zero_area_has_no_unit_price() {
        let d = display_in(0.0, 1000.0, AreaUnit::Sqft);
        assert_eq!(d.price_per_unit, None);
        assert_eq!(d.total_price, 1000.0);
    }
}
