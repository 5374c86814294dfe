//! Query façade: validates requests, loads one snapshot and runs the engine.
//!
//! This is the boundary an API layer calls into. It decides which records to
//! load and holds no geometry logic of its own.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use hashbrown::HashMap;
use tracing::debug;

use crate::coverage::{resolve, resolve_all, AreasByCompany};
use crate::error::{CoverageError, EntityKind, Result};
use crate::geometry::GeoPoint;
use crate::models::{Company, CoverageResult, Ranked};
use crate::ranking::{farthest_per_group, nearest_to, partition_by};
use crate::store::{LocationReader, LocationStore};

/// Coverage and proximity queries over a [`LocationStore`].
pub struct CoverageService<S> {
    store: S,
}

impl<S: LocationStore> CoverageService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether one of the company's polygons contains the client.
    pub async fn check_coverage(&self, client_id: i32, company_id: i32) -> Result<bool> {
        let result = self.coverage_details(client_id, company_id, None).await?;
        Ok(result.matched_coverage_area_id.is_some())
    }

    /// Whether the client is inside one of the company's polygons or within
    /// `radius_meters` of the company.
    pub async fn check_coverage_with_radius(
        &self,
        client_id: i32,
        company_id: i32,
        radius_meters: f64,
    ) -> Result<bool> {
        let result = self
            .coverage_details(client_id, company_id, Some(radius_meters))
            .await?;
        Ok(result.is_covered)
    }

    /// Full coverage evaluation of one client against one company.
    pub async fn coverage_details(
        &self,
        client_id: i32,
        company_id: i32,
        radius_meters: Option<f64>,
    ) -> Result<CoverageResult> {
        require_id(EntityKind::Client, client_id)?;
        require_id(EntityKind::Company, company_id)?;
        if let Some(radius) = radius_meters {
            require_distance("radius", radius)?;
        }

        let reader = self.store.begin_read().await?;
        let (client, company, areas) = futures::try_join!(
            reader.load_client(client_id),
            reader.load_company(company_id),
            reader.load_coverage_areas_for_company(company_id),
        )?;

        Ok(resolve(client.site()?, company.site()?, &areas, radius_meters))
    }

    /// Every company covering the client, nearest first.
    pub async fn client_coverages(
        &self,
        client_id: i32,
        radius_meters: Option<f64>,
    ) -> Result<Vec<CoverageResult>> {
        require_id(EntityKind::Client, client_id)?;
        if let Some(radius) = radius_meters {
            require_distance("radius", radius)?;
        }

        let reader = self.store.begin_read().await?;
        let (client, companies) =
            futures::try_join!(reader.load_client(client_id), reader.load_all_companies())?;

        let area_lists = try_join_all(
            companies
                .iter()
                .map(|company| reader.load_coverage_areas_for_company(company.id)),
        )
        .await?;
        let areas_by_company: AreasByCompany = companies
            .iter()
            .map(|company| company.id)
            .zip(area_lists)
            .collect();

        let covered = resolve_all(client.site()?, &companies, &areas_by_company, radius_meters)?;
        debug!(
            "Client {} covered by {} of {} companies",
            client_id,
            covered.len(),
            companies.len()
        );
        Ok(covered)
    }

    /// The `limit` clients closest to the company.
    pub async fn nearest_clients(&self, company_id: i32, limit: i64) -> Result<Vec<Ranked>> {
        require_id(EntityKind::Company, company_id)?;
        let k = require_limit(limit)?;

        let reader = self.store.begin_read().await?;
        let (company, clients) =
            futures::try_join!(reader.load_company(company_id), reader.load_all_clients())?;

        let origin = company.site()?;
        let candidates = located(clients.iter().map(|c| (c.id, c.location)));
        Ok(nearest_to(&origin.location, &candidates, k))
    }

    /// The `limit` companies closest to the client.
    pub async fn nearest_companies(&self, client_id: i32, limit: i64) -> Result<Vec<Ranked>> {
        require_id(EntityKind::Client, client_id)?;
        let k = require_limit(limit)?;

        let reader = self.store.begin_read().await?;
        let (client, companies) =
            futures::try_join!(reader.load_client(client_id), reader.load_all_companies())?;

        let origin = client.site()?;
        let candidates = located(companies.iter().map(|c| (c.id, c.location)));
        Ok(nearest_to(&origin.location, &candidates, k))
    }

    /// For each company with open deliveries, the delivery farthest from it.
    pub async fn farthest_open_delivery_per_company(&self) -> Result<BTreeMap<i32, Ranked>> {
        let reader = self.store.begin_read().await?;
        let (deliveries, companies) =
            futures::try_join!(reader.load_open_deliveries(), reader.load_all_companies())?;

        let companies: HashMap<i32, Company> =
            companies.into_iter().map(|c| (c.id, c)).collect();

        let routed = deliveries
            .iter()
            .filter_map(|d| d.location.map(|location| (d.company_id, (d.id, location))));
        let groups: BTreeMap<i32, Vec<(i32, GeoPoint)>> = partition_by(routed, |(company_id, _)| {
            *company_id
        })
        .into_iter()
        .map(|(company_id, members)| (company_id, members.into_iter().map(|(_, m)| m).collect()))
        .collect();

        farthest_per_group(&groups, |company_id| {
            let company = companies
                .get(company_id)
                .ok_or(CoverageError::NotFound {
                    kind: EntityKind::Company,
                    id: *company_id,
                })?;
            Ok(company.site()?.location)
        })
    }

    /// Clients whose nearest company is farther than `distance_meters`.
    ///
    /// Each entry carries the distance to that nearest company; entries are
    /// ordered by client id.
    pub async fn clients_beyond(&self, distance_meters: f64) -> Result<Vec<Ranked>> {
        require_distance("distance", distance_meters)?;

        let reader = self.store.begin_read().await?;
        let (clients, companies) =
            futures::try_join!(reader.load_all_clients(), reader.load_all_companies())?;

        let sites = located(companies.iter().map(|c| (c.id, c.location)));
        if sites.is_empty() {
            debug!("No located companies; no client can be measured");
            return Ok(Vec::new());
        }

        let mut beyond: Vec<Ranked> = located(clients.iter().map(|c| (c.id, c.location)))
            .into_iter()
            .filter_map(|(client_id, location)| {
                nearest_to(&location, &sites, 1)
                    .first()
                    .filter(|nearest| nearest.distance_meters > distance_meters)
                    .map(|nearest| Ranked {
                        id: client_id,
                        distance_meters: nearest.distance_meters,
                    })
            })
            .collect();
        beyond.sort_unstable_by_key(|entry| entry.id);

        Ok(beyond)
    }
}

/// Keep candidates that have a location; the rest cannot be ranked.
fn located(entries: impl Iterator<Item = (i32, Option<GeoPoint>)>) -> Vec<(i32, GeoPoint)> {
    entries
        .filter_map(|(id, location)| match location {
            Some(location) => Some((id, location)),
            None => {
                debug!("Skipping {} without location", id);
                None
            }
        })
        .collect()
}

fn require_id(kind: EntityKind, id: i32) -> Result<()> {
    if id <= 0 {
        return Err(CoverageError::InvalidArgument(format!(
            "{kind} id must be positive, got {id}"
        )));
    }
    Ok(())
}

fn require_distance(name: &str, meters: f64) -> Result<()> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(CoverageError::InvalidArgument(format!(
            "{name} must be a non-negative number of meters, got {meters}"
        )));
    }
    Ok(())
}

fn require_limit(limit: i64) -> Result<usize> {
    usize::try_from(limit).map_err(|_| {
        CoverageError::InvalidArgument(format!("limit must not be negative, got {limit}"))
    })
}
