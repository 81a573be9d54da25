//! Per-shape failure taxonomy.
//!
//! None of these abort an analysis pass: a failing shape is reported next to
//! the results of the shapes that succeeded.

use thiserror::Error;

use crate::model::ShapeId;

/// The point field that was missing from an input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointField {
    Latitude,
    Longitude,
    Sequence,
}

impl std::fmt::Display for PointField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PointField::Latitude => "shape_pt_lat",
            PointField::Longitude => "shape_pt_lon",
            PointField::Sequence => "shape_pt_sequence",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("shape {shape_id}: point #{index} is missing {field}")]
    MalformedPoint {
        shape_id: ShapeId,
        index: usize,
        field: PointField,
    },

    #[error("shape {shape_id} has no points")]
    EmptyPolyline { shape_id: ShapeId },

    #[error("shape {shape_id}: {missing} of {total} shape_dist_traveled values are missing")]
    IncompleteDistanceData {
        shape_id: ShapeId,
        missing: usize,
        total: usize,
    },
}

impl ShapeError {
    pub fn shape_id(&self) -> &ShapeId {
        match self {
            ShapeError::MalformedPoint { shape_id, .. }
            | ShapeError::EmptyPolyline { shape_id }
            | ShapeError::IncompleteDistanceData { shape_id, .. } => shape_id,
        }
    }

    /// Short machine-readable tag, used as the `reason` column in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeError::MalformedPoint { .. } => "malformed_point",
            ShapeError::EmptyPolyline { .. } => "empty_polyline",
            ShapeError::IncompleteDistanceData { .. } => "incomplete_distance_data",
        }
    }
}
