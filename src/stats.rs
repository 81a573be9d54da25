use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::types::ShapeAnalysis;
use crate::analyzers::units::DistanceUnit;
use crate::analyzers::utility::mean;
use crate::model::{Dataset, DistanceSource};

/// One summary row per analysis run.
#[derive(Debug, Default, Serialize)]
pub struct DatasetStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub total_points: usize,
    pub total_shapes: usize,

    // shape outcomes
    pub provided: usize,
    pub reconstructed: usize,
    pub excluded: usize,
    pub failed: usize,
    pub flagged: usize,
    pub degenerate: usize,

    // distances
    pub data_unit: DistanceUnit,
    pub threshold_m: f64,
    /// Mean of every point's cumulative distance, in meters.
    pub mean_distance_traveled_m: f64,
    /// Mean of the per-shape mean spacing, in meters.
    pub mean_point_spacing_m: f64,
}

impl DatasetStats {
    pub fn from_analysis(
        dataset: &Dataset,
        analysis: &ShapeAnalysis,
        data_unit: DistanceUnit,
        threshold_m: f64,
    ) -> Self {
        let mut s = DatasetStats {
            timestamp: Utc::now(),
            total_points: dataset.point_count(),
            total_shapes: dataset.len(),
            excluded: analysis.excluded.len(),
            failed: analysis.failures.len(),
            flagged: analysis.flagged().len(),
            data_unit,
            threshold_m,
            ..Default::default()
        };

        let mut distances = Vec::with_capacity(s.total_points);
        for polyline in &analysis.polylines {
            match polyline.source {
                DistanceSource::Provided => s.provided += 1,
                DistanceSource::Reconstructed => s.reconstructed += 1,
            }
            distances.extend(polyline.points.iter().map(|p| p.distance_traveled));
        }
        s.mean_distance_traveled_m = mean(&distances);

        let spacings: Vec<f64> = analysis
            .all_means()
            .iter()
            .filter(|m| !m.degenerate)
            .map(|m| m.mean_distance)
            .collect();
        s.mean_point_spacing_m = mean(&spacings);
        s.degenerate = analysis.all_means().iter().filter(|m| m.degenerate).count();

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn flagged_pct(&self) -> f64 {
        Self::pct(self.flagged, self.total_shapes)
    }

    /// Set the name of the file the dataset was read from
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}
