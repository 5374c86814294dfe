//! WGS-84 point type and its `POINT(lon lat)` text form.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^POINT\((-?\d+\.?\d*) (-?\d+\.?\d*)\)$").expect("point pattern is valid")
});

/// Geographic point (lon/lat, decimal degrees).
///
/// Always within longitude [-180, 180] and latitude [-90, 90]; the only way
/// to build one is through [`GeoPoint::new`] or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeometryError> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeometryError::OutOfRange { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
}

/// Parse the canonical `POINT(<lon> <lat>)` form.
///
/// Single ASCII space between coordinates, optional minus sign and decimal
/// fraction on each. Anything else is `MalformedPoint`.
pub fn parse_point(text: &str) -> Result<GeoPoint, GeometryError> {
    let caps = POINT_RE
        .captures(text)
        .ok_or_else(|| GeometryError::MalformedPoint(text.to_string()))?;

    let lon: f64 = caps[1]
        .parse()
        .map_err(|_| GeometryError::MalformedPoint(text.to_string()))?;
    let lat: f64 = caps[2]
        .parse()
        .map_err(|_| GeometryError::MalformedPoint(text.to_string()))?;

    GeoPoint::new(lon, lat)
}

impl FromStr for GeoPoint {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_point(s)
    }
}

impl TryFrom<String> for GeoPoint {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_point(&value)
    }
}

impl From<GeoPoint> for String {
    fn from(point: GeoPoint) -> Self {
        point.to_string()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POINT({} {})", self.lon, self.lat)
    }
}

impl From<GeoPoint> for geo_types::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::Point::new(point.lon, point.lat)
    }
}

impl From<GeoPoint> for geo_types::Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::Coord {
            x: point.lon,
            y: point.lat,
        }
    }
}
