//! Shape and point types shared by the parser, the analyzers and the writers.

use crate::geo::{center, haversine_distance};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a shape.
///
/// Ordered naturally: ids that parse as integers compare numerically and
/// come before any non-numeric id. Equal numbers with different spellings
/// (`"01"`, `"1"`) fall back to comparing the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<i128> {
        self.0.parse().ok()
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for ShapeId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ShapeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A validated shape point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    pub sequence: u32,
}

/// A point with its cumulative distance from the first point of the shape, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedPoint {
    pub point: Point,
    pub distance_traveled: f64,
}

/// One row of `shapes.txt`.
///
/// Every field but the id is optional so that incomplete rows survive
/// parsing and can be reported against their shape. Cells that are empty or
/// not a number read as `None`.
///
/// See <https://gtfs.org/schedule/reference/#shapestxt>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRow {
    pub shape_id: ShapeId,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shape_pt_lat: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shape_pt_lon: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shape_pt_sequence: Option<u32>,

    /// Distance from the first point of the shape, in the unit of the feed.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shape_dist_traveled: Option<f64>,
}

/// A point as read from the input, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sequence: Option<u32>,
    pub distance_traveled: Option<f64>,
}

impl From<&ShapeRow> for RawPoint {
    fn from(row: &ShapeRow) -> Self {
        Self {
            latitude: row.shape_pt_lat,
            longitude: row.shape_pt_lon,
            sequence: row.shape_pt_sequence,
            // NaN is how some exporters spell "no value"
            distance_traveled: row.shape_dist_traveled.filter(|d| !d.is_nan()),
        }
    }
}

/// Overview of one shape for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSummary {
    pub shape_id: ShapeId,
    pub points: usize,
    pub incomplete_points: usize,
    pub length_m: f64,
    /// `(latitude, longitude)`, `None` when no point is usable.
    pub center: Option<(f64, f64)>,
}

/// How much of a shape's `shape_dist_traveled` column is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceData {
    Complete,
    Absent,
    Partial { missing: usize },
}

/// All input points of one shape, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawShape {
    pub id: ShapeId,
    pub points: Vec<RawPoint>,
}

impl RawShape {
    pub fn new(id: impl Into<ShapeId>, points: Vec<RawPoint>) -> Self {
        Self {
            id: id.into(),
            points,
        }
    }

    /// Length and center of the usable points, skipping incomplete ones.
    pub fn summary(&self) -> ShapeSummary {
        let mut points: Vec<Point> = self
            .points
            .iter()
            .filter_map(|p| {
                Some(Point {
                    latitude: p.latitude.filter(|v| v.is_finite())?,
                    longitude: p.longitude.filter(|v| v.is_finite())?,
                    sequence: p.sequence?,
                })
            })
            .collect();
        points.sort_by_key(|p| p.sequence);

        ShapeSummary {
            shape_id: self.id.clone(),
            points: self.points.len(),
            incomplete_points: self.points.len() - points.len(),
            length_m: points
                .windows(2)
                .map(|pair| haversine_distance(&pair[0], &pair[1]))
                .sum(),
            center: center(&points),
        }
    }

    pub fn distance_data(&self) -> DistanceData {
        let missing = self
            .points
            .iter()
            .filter(|p| p.distance_traveled.is_none())
            .count();
        match missing {
            0 => DistanceData::Complete,
            m if m == self.points.len() => DistanceData::Absent,
            m => DistanceData::Partial { missing: m },
        }
    }
}

/// Where the distances of a [`Polyline`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSource {
    Provided,
    Reconstructed,
}

/// A validated shape with cumulative distances, sorted by sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub id: ShapeId,
    pub points: Vec<AnnotatedPoint>,
    pub source: DistanceSource,
}

impl Polyline {
    /// Largest cumulative distance, which is the shape length for well-formed data.
    pub fn final_distance(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.distance_traveled)
            .fold(0.0, f64::max)
    }
}

/// Input rows grouped by shape id.
#[derive(Debug, Default)]
pub struct Dataset {
    shapes: BTreeMap<ShapeId, RawShape>,
}

impl Dataset {
    pub fn from_rows(rows: &[ShapeRow]) -> Self {
        let mut shapes: BTreeMap<ShapeId, RawShape> = BTreeMap::new();
        for row in rows {
            shapes
                .entry(row.shape_id.clone())
                .or_insert_with(|| RawShape::new(row.shape_id.clone(), Vec::new()))
                .points
                .push(RawPoint::from(row));
        }
        Self { shapes }
    }

    pub fn from_shapes(shapes: impl IntoIterator<Item = RawShape>) -> Self {
        Self {
            shapes: shapes.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.shapes.values().map(|s| s.points.len()).sum()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&RawShape> {
        self.shapes.get(id)
    }

    /// Shapes in ascending id order.
    pub fn shapes(&self) -> impl Iterator<Item = &RawShape> {
        self.shapes.values()
    }

    /// Every non-missing `shape_dist_traveled` value in the dataset.
    pub fn provided_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.shapes
            .values()
            .flat_map(|s| s.points.iter().filter_map(|p| p.distance_traveled))
    }

    /// Summaries of the whitespace-separated shape ids in `ids`, in the order
    /// given, or of every shape when `ids` is `None`. Ids with no shape in
    /// the dataset are returned separately.
    pub fn summaries(&self, ids: Option<&str>) -> (Vec<ShapeSummary>, Vec<ShapeId>) {
        let Some(ids) = ids else {
            return (self.shapes().map(RawShape::summary).collect(), Vec::new());
        };

        let mut summaries = Vec::new();
        let mut unknown = Vec::new();
        for id in ids.split_whitespace().map(ShapeId::from) {
            match self.get(&id) {
                Some(shape) => summaries.push(shape.summary()),
                None => unknown.push(id),
            }
        }
        (summaries, unknown)
    }

    pub fn into_shapes(self) -> Vec<RawShape> {
        self.shapes.into_values().collect()
    }
}
