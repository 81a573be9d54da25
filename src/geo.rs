//! Great-circle distance on a spherical Earth.

use crate::model::Point;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in decimal degrees.
///
/// Coordinates are not range-checked; any finite input yields a finite result.
pub fn haversine_distance(a: &Point, b: &Point) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();

    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Arithmetic mean of the coordinates, or `None` for an empty slice.
pub fn center(points: &[Point]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.latitude).sum::<f64>() / n;
    let lon = points.iter().map(|p| p.longitude).sum::<f64>() / n;
    Some((lat, lon))
}
