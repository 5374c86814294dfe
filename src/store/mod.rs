//! Read-only data access consumed by the query façade.
//!
//! A [`LocationStore`] hands out [`LocationReader`]s; every load made through
//! one reader observes the same point-in-time state of the store, so a
//! concurrent write never shows up halfway through a computation.

mod memory;

use std::future::Future;

use crate::error::StoreError;
use crate::models::{Client, Company, CoverageArea, DeliveryPoint};

pub use memory::{Dataset, MemoryReader, MemoryStore};

/// Source of consistent read handles.
pub trait LocationStore: Send + Sync {
    type Reader: LocationReader + Send + Sync;

    /// Open a read handle pinned to the current state of the store.
    fn begin_read(&self) -> impl Future<Output = Result<Self::Reader, StoreError>> + Send;
}

/// Loads against one snapshot. Dropping a pending future abandons the fetch.
pub trait LocationReader {
    /// Fails with `NotFound` if the client does not exist.
    fn load_client(&self, id: i32) -> impl Future<Output = Result<Client, StoreError>> + Send;

    /// Fails with `NotFound` if the company does not exist.
    fn load_company(&self, id: i32) -> impl Future<Output = Result<Company, StoreError>> + Send;

    /// Areas assigned to the company; empty when none are.
    fn load_coverage_areas_for_company(
        &self,
        company_id: i32,
    ) -> impl Future<Output = Result<Vec<CoverageArea>, StoreError>> + Send;

    fn load_all_clients(&self) -> impl Future<Output = Result<Vec<Client>, StoreError>> + Send;

    fn load_all_companies(&self) -> impl Future<Output = Result<Vec<Company>, StoreError>> + Send;

    /// Deliveries still pending or urgent.
    fn load_open_deliveries(
        &self,
    ) -> impl Future<Output = Result<Vec<DeliveryPoint>, StoreError>> + Send;
}
