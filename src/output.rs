//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON serialization, CSV append for run
//! summaries, CSV reports and `shapes.txt` export.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Polyline, ShapeId};
use crate::stats::DatasetStats;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Logs dataset statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &DatasetStats) {
    debug!("{:#?}", stats);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`DatasetStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &DatasetStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("cannot open {path}"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}

/// Writes `records` to a fresh CSV file, replacing any existing one.
///
/// Headers come from the record's field names. An empty iterator leaves an
/// empty file.
pub fn write_records<T, I>(path: &str, records: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut count = 0;
    for record in records {
        writer.serialize(record)?;
        count += 1;
    }
    writer.flush()?;

    debug!(path, count, "Wrote CSV report");
    Ok(count)
}

/// One exported `shapes.txt` row. Distances are in meters.
#[derive(Debug, Serialize)]
struct ShapeRecord<'a> {
    shape_id: &'a ShapeId,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: u32,
    shape_dist_traveled: f64,
}

/// Writes `polylines` as a GTFS `shapes.txt` with `shape_dist_traveled` filled in.
pub fn write_shapes(path: &str, polylines: &[Polyline]) -> Result<usize> {
    let rows = polylines.iter().flat_map(|polyline| {
        polyline.points.iter().map(move |p| ShapeRecord {
            shape_id: &polyline.id,
            shape_pt_lat: p.point.latitude,
            shape_pt_lon: p.point.longitude,
            shape_pt_sequence: p.point.sequence,
            shape_dist_traveled: p.distance_traveled,
        })
    });
    write_records(path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::MeanDistance;
    use crate::model::{AnnotatedPoint, DistanceSource, Point};
    use crate::parser::parse_shapes;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let stats = DatasetStats::default();
        print_pretty(&stats);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let stats = DatasetStats::default();
        print_json(&stats).unwrap();
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("shapes_analyser_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        let stats = DatasetStats::default();
        append_record(&path, &stats).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("shapes_analyser_test_header.csv");
        let _ = fs::remove_file(&path);

        let stats = DatasetStats::default();
        append_record(&path, &stats).unwrap();
        append_record(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records_replaces_file() {
        let path = temp_path("shapes_analyser_test_means.csv");
        let means = vec![MeanDistance {
            shape_id: ShapeId::from("7"),
            mean_distance: 250.0,
            point_count: 4,
            degenerate: false,
        }];

        write_records(&path, &means).unwrap();
        let count = write_records(&path, &means).unwrap();
        assert_eq!(count, 1);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "shape_id,mean_distance,point_count,degenerate");
        assert_eq!(lines[1], "7,250.0,4,false");
        assert_eq!(lines.len(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_shapes_is_readable_as_shapes_txt() {
        let path = temp_path("shapes_analyser_test_export.txt");
        let polyline = Polyline {
            id: ShapeId::from("A_shp"),
            points: vec![
                AnnotatedPoint {
                    point: Point {
                        latitude: 37.61956,
                        longitude: -122.48161,
                        sequence: 0,
                    },
                    distance_traveled: 0.0,
                },
                AnnotatedPoint {
                    point: Point {
                        latitude: 37.64430,
                        longitude: -122.41070,
                        sequence: 6,
                    },
                    distance_traveled: 6831.0,
                },
            ],
            source: DistanceSource::Reconstructed,
        };

        assert_eq!(write_shapes(&path, &[polyline]).unwrap(), 2);

        let rows = parse_shapes(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].shape_pt_sequence, Some(6));
        assert_eq!(rows[1].shape_dist_traveled, Some(6831.0));

        fs::remove_file(&path).unwrap();
    }
}
