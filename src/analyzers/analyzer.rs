use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::analyzers::classify::classify;
use crate::analyzers::reconstruct::{reconstruct, validate_points};
use crate::analyzers::types::{ExcludedShape, ShapeAnalysis, ShapeFailure, ShapeSummary};
use crate::analyzers::units::DistanceUnit;
use crate::error::ShapeError;
use crate::model::{
    AnnotatedPoint, Dataset, DistanceData, DistanceSource, Polyline, RawShape, ShapeId,
};

/// Settings for one [`analyze_shapes`] pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Flagging threshold in meters.
    pub threshold_m: f64,
    /// Unit of the provided `shape_dist_traveled` values.
    pub data_unit: DistanceUnit,
    /// Recompute distances even for shapes whose provided distances are complete.
    pub force_reconstruct: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            threshold_m: 100.0,
            data_unit: DistanceUnit::Meters,
            force_reconstruct: false,
        }
    }
}

enum ShapeOutcome {
    Ready(Polyline),
    Excluded(ExcludedShape),
    Failed(ShapeFailure),
}

/// Validates, reconstructs and classifies every shape of `dataset`.
///
/// Shapes are independent and processed in parallel. Per shape:
///
/// - no points, or a point missing a coordinate or sequence: failure
/// - every `shape_dist_traveled` present: used as provided, scaled to meters
/// - every `shape_dist_traveled` missing: reconstructed with haversine
/// - some missing: excluded from classification
///
/// All result lists come back in ascending shape id order.
#[tracing::instrument(skip_all, fields(shapes = dataset.len(), threshold_m = options.threshold_m))]
pub fn analyze_shapes(dataset: &Dataset, options: &AnalysisOptions) -> ShapeAnalysis {
    let shapes: Vec<&RawShape> = dataset.shapes().collect();

    let outcomes: Vec<ShapeOutcome> = shapes
        .par_iter()
        .map(|shape| process_shape(shape, options))
        .collect();

    let mut analysis = ShapeAnalysis::default();
    for outcome in outcomes {
        match outcome {
            ShapeOutcome::Ready(polyline) => analysis.polylines.push(polyline),
            ShapeOutcome::Excluded(excluded) => analysis.excluded.push(excluded),
            ShapeOutcome::Failed(failure) => analysis.failures.push(failure),
        }
    }

    let summaries: BTreeMap<ShapeId, ShapeSummary> = analysis
        .polylines
        .iter()
        .map(|p| (p.id.clone(), ShapeSummary::from(p)))
        .collect();
    let excluded: BTreeSet<ShapeId> = analysis
        .excluded
        .iter()
        .map(|e| e.shape_id.clone())
        .collect();

    analysis.classification = classify(&summaries, options.threshold_m, &excluded);

    info!(
        usable = analysis.polylines.len(),
        excluded = analysis.excluded.len(),
        failed = analysis.failures.len(),
        flagged = analysis.classification.flagged.len(),
        "Shape analysis complete"
    );

    analysis
}

fn process_shape(shape: &RawShape, options: &AnalysisOptions) -> ShapeOutcome {
    let points = match validate_points(shape) {
        Ok(points) => points,
        Err(error) => {
            warn!(shape_id = %shape.id, error = %error, "Rejecting shape");
            return ShapeOutcome::Failed(ShapeFailure::from(error));
        }
    };

    let data = shape.distance_data();
    if let DistanceData::Partial { missing } = data {
        let error = ShapeError::IncompleteDistanceData {
            shape_id: shape.id.clone(),
            missing,
            total: shape.points.len(),
        };
        warn!(error = %error, "Excluding shape from classification");
        return ShapeOutcome::Excluded(ExcludedShape {
            shape_id: shape.id.clone(),
            missing_distances: missing,
            total_points: shape.points.len(),
        });
    }

    let polyline = if data == DistanceData::Complete && !options.force_reconstruct {
        let mut annotated: Vec<AnnotatedPoint> = points
            .into_iter()
            .zip(&shape.points)
            .map(|(point, raw)| AnnotatedPoint {
                point,
                distance_traveled: options
                    .data_unit
                    .to_meters(raw.distance_traveled.unwrap_or_default()),
            })
            .collect();
        annotated.sort_by_key(|p| p.point.sequence);
        Polyline {
            id: shape.id.clone(),
            points: annotated,
            source: DistanceSource::Provided,
        }
    } else {
        debug!(shape_id = %shape.id, points = points.len(), "Reconstructing distances");
        Polyline {
            id: shape.id.clone(),
            points: reconstruct(&points),
            source: DistanceSource::Reconstructed,
        }
    };

    ShapeOutcome::Ready(polyline)
}
