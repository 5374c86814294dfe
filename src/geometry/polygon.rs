//! Simple polygons and point containment.
//!
//! Containment is the even-odd ray cast with half-open edges. The boundary is
//! open: a point lying exactly on an edge or vertex is never contained.

use geo::{BoundingRect, Centroid};
use geo_types::{Coord, LineString, Rect};
use serde::{Deserialize, Serialize};

use super::GeoPoint;
use crate::error::GeometryError;

/// A closed outer ring (no holes) with cached envelope and centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Polygon {
    ring: Vec<GeoPoint>,
    envelope: Rect<f64>,
    centroid: Option<GeoPoint>,
}

impl Polygon {
    /// Ring vertices, first == last.
    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Bounding box of the ring
    pub fn envelope(&self) -> Rect<f64> {
        self.envelope
    }

    /// Area centroid, used as the polygon's reference point.
    ///
    /// `None` for rings that enclose no area and have no usable centroid.
    pub fn centroid(&self) -> Option<GeoPoint> {
        self.centroid
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        contains(self, point)
    }
}

/// Check ring closure and size, then build a [`Polygon`].
pub fn validate_polygon(ring: Vec<GeoPoint>) -> Result<Polygon, GeometryError> {
    if ring.len() < 4 {
        return Err(GeometryError::InvalidRing(format!(
            "ring needs at least 4 points, got {}",
            ring.len()
        )));
    }
    if ring.first() != ring.last() {
        return Err(GeometryError::InvalidRing(
            "first and last points differ".to_string(),
        ));
    }

    let coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord::from(*p)).collect();
    let shape = geo_types::Polygon::new(LineString::new(coords), vec![]);

    let envelope = shape
        .bounding_rect()
        .ok_or_else(|| GeometryError::InvalidRing("ring has no extent".to_string()))?;
    let centroid = shape
        .centroid()
        .and_then(|c| GeoPoint::new(c.x(), c.y()).ok());

    Ok(Polygon {
        ring,
        envelope,
        centroid,
    })
}

/// Even-odd containment test with an open boundary.
pub fn contains(polygon: &Polygon, point: &GeoPoint) -> bool {
    let (x, y) = (point.lon(), point.lat());

    // Anything on or outside the envelope cannot be strictly inside.
    let envelope = polygon.envelope();
    let (min, max) = (envelope.min(), envelope.max());
    if x <= min.x || x >= max.x || y <= min.y || y >= max.y {
        return false;
    }

    let mut inside = false;
    for edge in polygon.ring().windows(2) {
        let (x1, y1) = (edge[0].lon(), edge[0].lat());
        let (x2, y2) = (edge[1].lon(), edge[1].lat());

        if on_segment(x, y, x1, y1, x2, y2) {
            return false;
        }

        let straddles = (y1 <= y && y < y2) || (y2 <= y && y < y1);
        if straddles {
            let x_cross = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
            if x_cross > x {
                inside = !inside;
            }
        }
    }

    inside
}

fn on_segment(x: f64, y: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let cross = (x2 - x1) * (y - y1) - (y2 - y1) * (x - x1);
    cross == 0.0
        && x >= x1.min(x2)
        && x <= x1.max(x2)
        && y >= y1.min(y2)
        && y <= y1.max(y2)
}

/// Parse `POLYGON((<lon> <lat>, ...))`, the text form polygons are stored in.
///
/// Only a single outer ring is accepted; a comma may be followed by spaces.
pub fn parse_polygon(text: &str) -> Result<Polygon, GeometryError> {
    let malformed = || GeometryError::MalformedPolygon(text.to_string());

    let body = text
        .strip_prefix("POLYGON((")
        .and_then(|rest| rest.strip_suffix("))"))
        .ok_or_else(malformed)?;
    if body.contains('(') || body.contains(')') {
        return Err(malformed());
    }

    let mut ring = Vec::new();
    for vertex in body.split(',') {
        let mut parts = vertex.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let lon: f64 = lon.parse().map_err(|_| malformed())?;
        let lat: f64 = lat.parse().map_err(|_| malformed())?;
        ring.push(GeoPoint::new(lon, lat)?);
    }

    validate_polygon(ring)
}

impl TryFrom<String> for Polygon {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_polygon(&value)
    }
}

impl From<Polygon> for String {
    fn from(polygon: Polygon) -> Self {
        polygon.to_string()
    }
}

impl std::fmt::Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "POLYGON((")?;
        for (i, p) in self.ring().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", p.lon(), p.lat())?;
        }
        write!(f, "))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat).unwrap()
    }

    fn santiago_square() -> Polygon {
        validate_polygon(vec![
            pt(-70.65, -33.40),
            pt(-70.55, -33.40),
            pt(-70.55, -33.50),
            pt(-70.65, -33.50),
            pt(-70.65, -33.40),
        ])
        .unwrap()
    }

    #[test]
    fn test_point_inside_square() {
        assert!(contains(&santiago_square(), &pt(-70.60, -33.45)));
    }

    #[test]
    fn test_points_outside() {
        let square = santiago_square();
        assert!(!contains(&square, &pt(-70.70, -33.45)));
        assert!(!contains(&square, &pt(-70.60, -33.30)));
        assert!(!contains(&square, &pt(10.0, 10.0)));
    }

    #[test]
    fn test_boundary_is_open() {
        let square = santiago_square();
        // edges
        assert!(!contains(&square, &pt(-70.60, -33.40)));
        assert!(!contains(&square, &pt(-70.55, -33.45)));
        assert!(!contains(&square, &pt(-70.60, -33.50)));
        assert!(!contains(&square, &pt(-70.65, -33.45)));
        // vertices
        assert!(!contains(&square, &pt(-70.65, -33.40)));
        assert!(!contains(&square, &pt(-70.55, -33.50)));
    }

    #[test]
    fn test_diagonal_edge_boundary() {
        let triangle =
            validate_polygon(vec![pt(0.0, 0.0), pt(4.0, 0.0), pt(0.0, 4.0), pt(0.0, 0.0)])
                .unwrap();
        assert!(contains(&triangle, &pt(1.0, 1.0)));
        assert!(!contains(&triangle, &pt(2.0, 2.0)));
        assert!(!contains(&triangle, &pt(3.0, 3.0)));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening to the north
        let u = validate_polygon(vec![
            pt(0.0, 0.0),
            pt(3.0, 0.0),
            pt(3.0, 3.0),
            pt(2.0, 3.0),
            pt(2.0, 1.0),
            pt(1.0, 1.0),
            pt(1.0, 3.0),
            pt(0.0, 3.0),
            pt(0.0, 0.0),
        ])
        .unwrap();
        assert!(contains(&u, &pt(0.5, 2.0)));
        assert!(contains(&u, &pt(2.5, 2.0)));
        assert!(!contains(&u, &pt(1.5, 2.0)));
        // ray through the reflex vertex row
        assert!(contains(&u, &pt(0.5, 1.0)));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let clockwise = validate_polygon(vec![
            pt(-70.65, -33.40),
            pt(-70.65, -33.50),
            pt(-70.55, -33.50),
            pt(-70.55, -33.40),
            pt(-70.65, -33.40),
        ])
        .unwrap();
        assert!(contains(&clockwise, &pt(-70.60, -33.45)));
    }

    #[test]
    fn test_validate_rejects_short_ring() {
        let err = validate_polygon(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidRing(_)));
    }

    #[test]
    fn test_validate_rejects_open_ring() {
        let err = validate_polygon(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidRing(_)));
    }

    #[test]
    fn test_ring_and_envelope() {
        let square = santiago_square();
        assert_eq!(square.ring().len(), 5);
        assert_eq!(square.ring().first(), square.ring().last());

        let envelope = square.envelope();
        assert_eq!((envelope.min().x, envelope.min().y), (-70.65, -33.50));
        assert_eq!((envelope.max().x, envelope.max().y), (-70.55, -33.40));
    }

    #[test]
    fn test_centroid_of_square() {
        let c = santiago_square().centroid().unwrap();
        assert!((c.lon() - -70.60).abs() < 1e-6);
        assert!((c.lat() - -33.45).abs() < 1e-6);
    }

    #[test]
    fn test_parse_polygon_forms() {
        let compact =
            parse_polygon("POLYGON((-70.65 -33.4,-70.55 -33.4,-70.55 -33.5,-70.65 -33.5,-70.65 -33.4))")
                .unwrap();
        let spaced = parse_polygon(
            "POLYGON((-70.65 -33.4, -70.55 -33.4, -70.55 -33.5, -70.65 -33.5, -70.65 -33.4))",
        )
        .unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(parse_polygon(&compact.to_string()).unwrap(), compact);
    }

    #[test]
    fn test_parse_polygon_errors() {
        assert!(matches!(
            parse_polygon("POLYGON((0 0, 1 0, 1 1, 0 0), (0.2 0.2, 0.3 0.2, 0.3 0.3, 0.2 0.2))"),
            Err(GeometryError::MalformedPolygon(_))
        ));
        assert!(matches!(
            parse_polygon("POLYGON((0 0, 1 x, 1 1, 0 0))"),
            Err(GeometryError::MalformedPolygon(_))
        ));
        assert!(matches!(
            parse_polygon("POLYGON((0 0, 1 0, 1 1, 0 1))"),
            Err(GeometryError::InvalidRing(_))
        ));
        assert!(matches!(
            parse_polygon("POLYGON((0 0, 200 0, 1 1, 0 0))"),
            Err(GeometryError::OutOfRange { .. })
        ));
    }
}
