//! Result records returned to callers of the query façade.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one client against one company.
///
/// `matched_coverage_area_id` is set only when a polygon covered the client.
/// `distance_meters` is always the client-to-company distance, whichever rule
/// decided coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub client_id: i32,
    pub company_id: i32,
    pub matched_coverage_area_id: Option<i32>,
    pub is_covered: bool,
    pub distance_meters: f64,
}

impl CoverageResult {
    /// Covered through the radius rule rather than a polygon
    pub fn is_radius_match(&self) -> bool {
        self.is_covered && self.matched_coverage_area_id.is_none()
    }
}

/// An entry of a ranked sequence: who, and how far from the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ranked<I = i32> {
    pub id: I,
    pub distance_meters: f64,
}
