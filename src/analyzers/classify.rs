use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::analyzers::types::{Classification, MeanDistance, ShapeSummary};
use crate::model::ShapeId;

/// Scores every shape by its mean spacing between points and flags those
/// strictly above `threshold` (meters).
///
/// Shapes listed in `excluded` get no score at all. A single-point shape
/// scores 0 and is marked `degenerate`. Both result lists follow the
/// ascending [`ShapeId`] order of `shapes`.
pub fn classify(
    shapes: &BTreeMap<ShapeId, ShapeSummary>,
    threshold: f64,
    excluded: &BTreeSet<ShapeId>,
) -> Classification {
    let mut classification = Classification::default();

    for (shape_id, summary) in shapes {
        if excluded.contains(shape_id) {
            continue;
        }
        if summary.point_count == 0 {
            warn!(shape_id = %shape_id, "Shape without points reached the classifier, skipping");
            continue;
        }

        let mean = MeanDistance {
            shape_id: shape_id.clone(),
            mean_distance: summary.final_distance / summary.point_count as f64,
            point_count: summary.point_count,
            degenerate: summary.point_count == 1,
        };

        if mean.mean_distance > threshold {
            classification.flagged.push(mean.clone());
        }
        classification.all_means.push(mean);
    }

    classification
}
