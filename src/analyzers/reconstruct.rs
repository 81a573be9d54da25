use crate::error::{PointField, ShapeError};
use crate::geo::haversine_distance;
use crate::model::{AnnotatedPoint, Point, RawShape};

/// Computes the cumulative haversine distance, in meters, at every point.
///
/// Points are stably sorted by `sequence` first, so duplicate sequence
/// numbers keep their input order. The first point is always at 0.
pub fn reconstruct(points: &[Point]) -> Vec<AnnotatedPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.sequence);

    let mut cumulative = 0.0;
    let mut previous: Option<&Point> = None;
    let mut annotated = Vec::with_capacity(sorted.len());

    for point in &sorted {
        if let Some(prev) = previous {
            cumulative += haversine_distance(prev, point);
        }
        annotated.push(AnnotatedPoint {
            point: *point,
            distance_traveled: cumulative,
        });
        previous = Some(point);
    }

    annotated
}

/// Validates every point of `shape`, rejecting the whole shape on the first
/// point that lacks a coordinate or sequence number. A NaN or infinite
/// coordinate counts as missing.
pub fn validate_points(shape: &RawShape) -> Result<Vec<Point>, ShapeError> {
    if shape.points.is_empty() {
        return Err(ShapeError::EmptyPolyline {
            shape_id: shape.id.clone(),
        });
    }

    shape
        .points
        .iter()
        .enumerate()
        .map(|(index, raw)| -> Result<Point, ShapeError> {
            let missing = |field| ShapeError::MalformedPoint {
                shape_id: shape.id.clone(),
                index,
                field,
            };
            Ok(Point {
                latitude: raw
                    .latitude
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| missing(PointField::Latitude))?,
                longitude: raw
                    .longitude
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| missing(PointField::Longitude))?,
                sequence: raw.sequence.ok_or_else(|| missing(PointField::Sequence))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawPoint, ShapeId};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn pt(latitude: f64, longitude: f64, sequence: u32) -> Point {
        Point {
            latitude,
            longitude,
            sequence,
        }
    }

    fn distances(annotated: &[AnnotatedPoint]) -> Vec<f64> {
        annotated.iter().map(|p| p.distance_traveled).collect()
    }

    #[test]
    fn test_three_points_on_equator() {
        let annotated = reconstruct(&[pt(0.0, 0.0, 1), pt(0.0, 0.0, 2), pt(0.0, 1.0, 3)]);

        let d = distances(&annotated);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 0.0);
        assert!(approx_eq(d[2], 111_195.0, 1.0), "got {}", d[2]);
    }

    #[test]
    fn test_single_point() {
        let annotated = reconstruct(&[pt(48.85, 2.35, 4)]);
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].distance_traveled, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct(&[]).is_empty());
    }

    #[test]
    fn test_sorts_by_sequence_not_input_order() {
        let annotated = reconstruct(&[pt(0.0, 2.0, 30), pt(0.0, 0.0, 10), pt(0.0, 1.0, 20)]);

        let sequences: Vec<u32> = annotated.iter().map(|p| p.point.sequence).collect();
        assert_eq!(sequences, vec![10, 20, 30]);
        let d = distances(&annotated);
        assert_eq!(d[0], 0.0);
        assert!(approx_eq(d[1], 111_195.0, 1.0));
        assert!(approx_eq(d[2], 2.0 * 111_195.0, 2.0));
    }

    #[test]
    fn test_duplicate_sequence_keeps_input_order() {
        let annotated = reconstruct(&[pt(0.0, 0.0, 1), pt(0.0, 5.0, 2), pt(0.0, 1.0, 2)]);
        assert_eq!(annotated[1].point.longitude, 5.0);
        assert_eq!(annotated[2].point.longitude, 1.0);
    }

    #[test]
    fn test_non_decreasing_and_idempotent() {
        let points = vec![
            pt(48.8566, 2.3522, 0),
            pt(48.8570, 2.3530, 1),
            pt(48.8570, 2.3530, 2),
            pt(48.8600, 2.3600, 3),
            pt(48.8550, 2.3400, 4),
        ];
        let first = reconstruct(&points);
        for pair in first.windows(2) {
            assert!(pair[1].distance_traveled >= pair[0].distance_traveled);
        }

        let replay: Vec<Point> = first.iter().map(|p| p.point).collect();
        let second = reconstruct(&replay);
        for (a, b) in first.iter().zip(&second) {
            assert!(approx_eq(a.distance_traveled, b.distance_traveled, 1e-9));
        }
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let shape = RawShape::new(
            "s",
            vec![
                RawPoint {
                    latitude: Some(1.0),
                    longitude: Some(1.0),
                    sequence: Some(1),
                    distance_traveled: None,
                },
                RawPoint {
                    latitude: Some(1.0),
                    longitude: None,
                    sequence: Some(2),
                    distance_traveled: None,
                },
            ],
        );

        let err = validate_points(&shape).unwrap_err();
        assert_eq!(
            err,
            ShapeError::MalformedPoint {
                shape_id: ShapeId::from("s"),
                index: 1,
                field: PointField::Longitude,
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_finite_coordinates() {
        let point = |latitude: f64, longitude: f64| RawPoint {
            latitude: Some(latitude),
            longitude: Some(longitude),
            sequence: Some(1),
            distance_traveled: None,
        };

        let nan_lat = RawShape::new("s", vec![point(0.0, 0.0), point(f64::NAN, 0.5)]);
        assert_eq!(
            validate_points(&nan_lat).unwrap_err(),
            ShapeError::MalformedPoint {
                shape_id: ShapeId::from("s"),
                index: 1,
                field: PointField::Latitude,
            }
        );

        let inf_lon = RawShape::new("s", vec![point(0.0, f64::INFINITY)]);
        assert!(matches!(
            validate_points(&inf_lon),
            Err(ShapeError::MalformedPoint {
                index: 0,
                field: PointField::Longitude,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_shape() {
        let shape = RawShape::new("empty", vec![]);
        assert!(matches!(
            validate_points(&shape),
            Err(ShapeError::EmptyPolyline { .. })
        ));
    }
}
