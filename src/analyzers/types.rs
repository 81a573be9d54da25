//! Data types produced by the analysis pipeline.

use serde::Serialize;

use crate::error::ShapeError;
use crate::model::{Polyline, ShapeId};

/// Classifier input for one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSummary {
    pub point_count: usize,
    /// Cumulative distance at the last point, in meters.
    pub final_distance: f64,
}

impl From<&Polyline> for ShapeSummary {
    fn from(polyline: &Polyline) -> Self {
        Self {
            point_count: polyline.points.len(),
            final_distance: polyline.final_distance(),
        }
    }
}

/// Mean spacing between the points of one shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanDistance {
    pub shape_id: ShapeId,
    /// Meters.
    pub mean_distance: f64,
    pub point_count: usize,
    /// Set for single-point shapes, whose mean says nothing about spacing.
    pub degenerate: bool,
}

/// Output of [`classify`](super::classify::classify), both lists in ascending shape id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub flagged: Vec<MeanDistance>,
    pub all_means: Vec<MeanDistance>,
}

/// A shape left out of classification because some provided distances are missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedShape {
    pub shape_id: ShapeId,
    pub missing_distances: usize,
    pub total_points: usize,
}

/// A shape rejected before reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFailure {
    pub shape_id: ShapeId,
    pub error: ShapeError,
}

impl From<ShapeError> for ShapeFailure {
    fn from(error: ShapeError) -> Self {
        Self {
            shape_id: error.shape_id().clone(),
            error,
        }
    }
}

/// CSV row for a failed shape.
#[derive(Debug, Serialize)]
pub struct FailureRecord<'a> {
    pub shape_id: &'a ShapeId,
    pub reason: &'static str,
    pub message: String,
}

impl<'a> From<&'a ShapeFailure> for FailureRecord<'a> {
    fn from(failure: &'a ShapeFailure) -> Self {
        Self {
            shape_id: &failure.shape_id,
            reason: failure.error.kind(),
            message: failure.error.to_string(),
        }
    }
}

impl<'a> From<&'a ExcludedShape> for FailureRecord<'a> {
    fn from(excluded: &'a ExcludedShape) -> Self {
        let error = ShapeError::IncompleteDistanceData {
            shape_id: excluded.shape_id.clone(),
            missing: excluded.missing_distances,
            total: excluded.total_points,
        };
        Self {
            shape_id: &excluded.shape_id,
            reason: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything one analysis pass produces.
///
/// `polylines` holds every shape that was either provided complete or
/// reconstructed; `excluded` and `failures` account for the rest.
#[derive(Debug, Clone, Default)]
pub struct ShapeAnalysis {
    pub polylines: Vec<Polyline>,
    pub classification: Classification,
    pub excluded: Vec<ExcludedShape>,
    pub failures: Vec<ShapeFailure>,
}

impl ShapeAnalysis {
    pub fn flagged(&self) -> &[MeanDistance] {
        &self.classification.flagged
    }

    pub fn all_means(&self) -> &[MeanDistance] {
        &self.classification.all_means
    }
}
