use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::analyzers::analyzer::AnalysisOptions;
use crate::analyzers::units::{DistanceUnit, UnitSetting};

/// Analysis settings, optionally read from a JSON file and then overridden
/// by command-line flags.
///
/// Stored as a plain JSON object on disk, every key optional:
/// ```json
/// {
///   "threshold": 1.5,
///   "threshold_unit": "km",
///   "data_unit": "auto"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub threshold: f64,
    pub threshold_unit: DistanceUnit,
    pub data_unit: UnitSetting,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            threshold_unit: DistanceUnit::Meters,
            data_unit: UnitSetting::Auto,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        Self::from_json(&content).with_context(|| format!("invalid config {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn merge(
        mut self,
        threshold: Option<f64>,
        threshold_unit: Option<DistanceUnit>,
        data_unit: Option<UnitSetting>,
    ) -> Self {
        if let Some(threshold) = threshold {
            self.threshold = threshold;
        }
        if let Some(unit) = threshold_unit {
            self.threshold_unit = unit;
        }
        if let Some(unit) = data_unit {
            self.data_unit = unit;
        }
        self
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_unit.to_meters(self.threshold)
    }

    /// Builds the options for one pass, resolving an `auto` data unit
    /// against the distances found in the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is NaN.
    pub fn options(&self, provided: &[f64]) -> Result<AnalysisOptions> {
        if self.threshold.is_nan() {
            bail!("threshold must be a number");
        }
        Ok(AnalysisOptions {
            threshold_m: self.threshold_m(),
            data_unit: self.data_unit.resolve(provided),
            force_reconstruct: false,
        })
    }
}
