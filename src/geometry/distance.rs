//! Great-circle distance on a spherical Earth.

use super::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
///
/// Symmetric in its arguments and exactly zero for identical points.
/// Distinct coordinates naming the same place on the sphere (any longitude at
/// a pole, longitude -180 vs 180) come out as zero up to rounding, well under
/// a micrometer.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    // abs() keeps the result bit-identical when the arguments are swapped
    let d_lat = (b.lat() - a.lat()).abs().to_radians();
    let d_lon = (b.lon() - a.lon()).abs().to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();
    let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lon * sin_lon;
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}
