//! Geometry kernel: points, simple polygons and geodesic distance.
//!
//! Pure functions over immutable values, safe to call from any thread.

mod distance;
mod point;
mod polygon;

pub use distance::{distance_meters, EARTH_RADIUS_METERS};
pub use point::{parse_point, GeoPoint};
pub use polygon::{contains, parse_polygon, validate_polygon, Polygon};
