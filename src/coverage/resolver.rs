use hashbrown::HashMap;
use tracing::debug;

use crate::error::CoverageError;
use crate::geometry::distance_meters;
use crate::models::{Company, CoverageArea, CoverageResult, Site};

/// Coverage areas keyed by the company they are assigned to.
pub type AreasByCompany = HashMap<i32, Vec<CoverageArea>>;

/// Evaluate coverage of `client` by `company`.
///
/// Among several containing areas the one whose centroid is nearest to the
/// client is reported; equal distances (or areas without a centroid) fall
/// back to the lowest area id.
pub fn resolve(
    client: Site,
    company: Site,
    candidate_areas: &[CoverageArea],
    radius_meters: Option<f64>,
) -> CoverageResult {
    let distance = distance_meters(&client.location, &company.location);

    let matched = candidate_areas
        .iter()
        .filter(|area| area.polygon.contains(&client.location))
        .map(|area| {
            let reference = area
                .polygon
                .centroid()
                .map(|c| distance_meters(&client.location, &c))
                .unwrap_or(f64::INFINITY);
            (reference, area.id)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, id)| id);

    let is_covered = matched.is_some() || radius_meters.is_some_and(|r| distance <= r);

    debug!(
        "Coverage of client {} by company {}: area={:?}, covered={}, distance={:.1}m",
        client.id, company.id, matched, is_covered, distance
    );

    CoverageResult {
        client_id: client.id,
        company_id: company.id,
        matched_coverage_area_id: matched,
        is_covered,
        distance_meters: distance,
    }
}

/// Every company covering `client`, nearest first (ties by company id).
///
/// Fails with `UnknownEntity` if any company has no location.
pub fn resolve_all(
    client: Site,
    companies: &[Company],
    areas_by_company: &AreasByCompany,
    radius_meters: Option<f64>,
) -> Result<Vec<CoverageResult>, CoverageError> {
    let mut covered = Vec::new();

    for company in companies {
        let site = company.site()?;
        let areas = areas_by_company
            .get(&company.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let result = resolve(client, site, areas, radius_meters);
        if result.is_covered {
            covered.push(result);
        }
    }

    covered.sort_by(|a, b| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then(a.company_id.cmp(&b.company_id))
    });

    Ok(covered)
}
