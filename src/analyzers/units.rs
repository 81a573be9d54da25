//! Distance units for provided `shape_dist_traveled` values and thresholds.
//!
//! GTFS leaves the unit of `shape_dist_traveled` to the producer. Feeds use
//! either meters or kilometers, so the unit is guessed from the data unless
//! the caller states it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dataset-wide mean distance above which values are taken to be meters.
pub const METERS_CUTOFF: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "m")]
    #[value(name = "m")]
    Meters,
    #[serde(rename = "km")]
    #[value(name = "km")]
    Kilometers,
}

impl DistanceUnit {
    pub fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
        }
    }

    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Meters => f.write_str("m"),
            DistanceUnit::Kilometers => f.write_str("km"),
        }
    }
}

/// Unit of provided distances: stated, or inferred with [`infer_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum UnitSetting {
    #[default]
    #[serde(rename = "auto")]
    #[value(name = "auto")]
    Auto,
    #[serde(rename = "m")]
    #[value(name = "m")]
    Meters,
    #[serde(rename = "km")]
    #[value(name = "km")]
    Kilometers,
}

impl UnitSetting {
    pub fn resolve(self, provided: &[f64]) -> DistanceUnit {
        match self {
            UnitSetting::Auto => infer_unit(provided),
            UnitSetting::Meters => DistanceUnit::Meters,
            UnitSetting::Kilometers => DistanceUnit::Kilometers,
        }
    }
}

/// Guesses the unit from the mean of every provided distance value.
///
/// | Mean        | Unit |
/// |-------------|------|
/// | > 50        | m    |
/// | <= 50       | km   |
/// | no values   | m    |
pub fn infer_unit(provided: &[f64]) -> DistanceUnit {
    if provided.is_empty() {
        return DistanceUnit::Meters;
    }
    match super::utility::mean(provided) {
        m if m > METERS_CUTOFF => DistanceUnit::Meters,
        _ => DistanceUnit::Kilometers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_unit_boundaries() {
        assert_eq!(infer_unit(&[]), DistanceUnit::Meters);
        assert_eq!(infer_unit(&[0.0, 100.0, 200.0]), DistanceUnit::Meters);
        assert_eq!(infer_unit(&[50.0, 50.0]), DistanceUnit::Kilometers);
        assert_eq!(infer_unit(&[0.0, 6.831, 15.8765]), DistanceUnit::Kilometers);
        assert_eq!(infer_unit(&[50.1]), DistanceUnit::Meters);
    }

    #[test]
    fn test_default_unit_is_meters() {
        assert_eq!(DistanceUnit::default(), DistanceUnit::Meters);
    }

    #[test]
    fn test_to_meters() {
        assert_eq!(DistanceUnit::Meters.to_meters(12.5), 12.5);
        assert_eq!(DistanceUnit::Kilometers.to_meters(1.5), 1500.0);
    }

    #[test]
    fn test_resolve_prefers_stated_unit() {
        let kilometer_like = [1.0, 2.0];
        assert_eq!(UnitSetting::Auto.resolve(&kilometer_like), DistanceUnit::Kilometers);
        assert_eq!(UnitSetting::Meters.resolve(&kilometer_like), DistanceUnit::Meters);
        assert_eq!(UnitSetting::Kilometers.resolve(&[]), DistanceUnit::Kilometers);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&DistanceUnit::Kilometers).unwrap(), "\"km\"");
        let setting: UnitSetting = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(setting, UnitSetting::Auto);
    }
}
