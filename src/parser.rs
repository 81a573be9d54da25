//! CSV parser for GTFS `shapes.txt`.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};

use crate::model::ShapeRow;

/// Decodes `shapes.txt` rows from raw CSV bytes.
///
/// Columns are matched by header name, extra columns are ignored and the
/// `shape_dist_traveled` column may be absent altogether.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or a row has no `shape_id`.
pub fn parse_shapes(bytes: &[u8]) -> Result<Vec<ShapeRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row: ShapeRow = record.with_context(|| format!("invalid shapes row at line {}", line + 2))?;
        rows.push(row);
    }

    Ok(rows)
}
