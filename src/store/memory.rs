//! In-memory store with copy-on-write snapshots.
//!
//! The whole dataset lives behind one `Arc`. Writers build a new revision and
//! swap it in; readers keep whichever revision was current when they opened.

use std::fs;
use std::future::{ready, Future};
use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{LocationReader, LocationStore};
use crate::error::{EntityKind, StoreError};
use crate::models::{Client, Company, CoverageArea, DeliveryPoint};

/// Serialized form of the store contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub coverage_areas: Vec<CoverageArea>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryPoint>,
}

impl Dataset {
    /// Decode a JSON dataset; points and polygons are validated on the way in.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::Decode(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Loading dataset from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// One published state of the store.
#[derive(Debug, Clone)]
struct Revision {
    number: u64,
    published_at: DateTime<Utc>,
    clients: HashMap<i32, Client>,
    companies: HashMap<i32, Company>,
    coverage_areas: HashMap<i32, CoverageArea>,
    deliveries: Vec<DeliveryPoint>,
}

impl Revision {
    fn from_dataset(number: u64, dataset: Dataset) -> Self {
        Self {
            number,
            published_at: Utc::now(),
            clients: dataset.clients.into_iter().map(|c| (c.id, c)).collect(),
            companies: dataset.companies.into_iter().map(|c| (c.id, c)).collect(),
            coverage_areas: dataset
                .coverage_areas
                .into_iter()
                .map(|a| (a.id, a))
                .collect(),
            deliveries: dataset.deliveries,
        }
    }

    fn next(&self) -> Self {
        Self {
            number: self.number + 1,
            published_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// In-memory [`LocationStore`].
pub struct MemoryStore {
    current: RwLock<Arc<Revision>>,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        info!(
            "Store initialised with {} clients, {} companies, {} coverage areas, {} deliveries",
            dataset.clients.len(),
            dataset.companies.len(),
            dataset.coverage_areas.len(),
            dataset.deliveries.len()
        );
        Self {
            current: RwLock::new(Arc::new(Revision::from_dataset(1, dataset))),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(Dataset::load_from_file(path)?))
    }

    /// Pin the current revision.
    pub fn snapshot(&self) -> Result<MemoryReader, StoreError> {
        let current = self
            .current
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(MemoryReader {
            revision: Arc::clone(&current),
        })
    }

    pub fn upsert_client(&self, client: Client) -> Result<u64, StoreError> {
        self.publish(|rev| {
            rev.clients.insert(client.id, client);
        })
    }

    pub fn upsert_company(&self, company: Company) -> Result<u64, StoreError> {
        self.publish(|rev| {
            rev.companies.insert(company.id, company);
        })
    }

    pub fn upsert_coverage_area(&self, area: CoverageArea) -> Result<u64, StoreError> {
        self.publish(|rev| {
            rev.coverage_areas.insert(area.id, area);
        })
    }

    /// Delete an area and drop it from every company's assignments.
    pub fn remove_coverage_area(&self, id: i32) -> Result<u64, StoreError> {
        self.publish(|rev| {
            rev.coverage_areas.remove(&id);
            for company in rev.companies.values_mut() {
                company.coverage_area_ids.remove(&id);
            }
        })
    }

    pub fn upsert_delivery(&self, delivery: DeliveryPoint) -> Result<u64, StoreError> {
        self.publish(|rev| {
            rev.deliveries.retain(|d| d.id != delivery.id);
            rev.deliveries.push(delivery);
        })
    }

    fn publish<F>(&self, change: F) -> Result<u64, StoreError>
    where
        F: FnOnce(&mut Revision),
    {
        let mut current = self
            .current
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        let mut next = current.next();
        change(&mut next);
        let (number, published_at) = (next.number, next.published_at);
        *current = Arc::new(next);

        debug!(
            "Published store revision {} at {}",
            number,
            published_at.to_rfc3339()
        );
        Ok(number)
    }
}

impl LocationStore for MemoryStore {
    type Reader = MemoryReader;

    fn begin_read(&self) -> impl Future<Output = Result<Self::Reader, StoreError>> + Send {
        ready(self.snapshot())
    }
}

/// Read handle over one store revision.
#[derive(Debug, Clone)]
pub struct MemoryReader {
    revision: Arc<Revision>,
}

impl MemoryReader {
    /// Revision number this reader is pinned to
    pub fn revision(&self) -> u64 {
        self.revision.number
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.revision.published_at
    }

    fn client(&self, id: i32) -> Result<Client, StoreError> {
        self.revision
            .clients
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Client,
                id,
            })
    }

    fn company(&self, id: i32) -> Result<Company, StoreError> {
        self.revision
            .companies
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Company,
                id,
            })
    }

    fn areas_for(&self, company_id: i32) -> Result<Vec<CoverageArea>, StoreError> {
        let company = self.company(company_id)?;
        company
            .coverage_area_ids
            .iter()
            .map(|id| {
                self.revision
                    .coverage_areas
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::NotFound {
                        kind: EntityKind::CoverageArea,
                        id: *id,
                    })
            })
            .collect()
    }

    fn sorted<T>(values: impl Iterator<Item = T>, id: impl Fn(&T) -> i32) -> Vec<T> {
        let mut values: Vec<T> = values.collect();
        values.sort_by_key(|v| id(v));
        values
    }
}

impl LocationReader for MemoryReader {
    fn load_client(&self, id: i32) -> impl Future<Output = Result<Client, StoreError>> + Send {
        ready(self.client(id))
    }

    fn load_company(&self, id: i32) -> impl Future<Output = Result<Company, StoreError>> + Send {
        ready(self.company(id))
    }

    fn load_coverage_areas_for_company(
        &self,
        company_id: i32,
    ) -> impl Future<Output = Result<Vec<CoverageArea>, StoreError>> + Send {
        ready(self.areas_for(company_id))
    }

    fn load_all_clients(&self) -> impl Future<Output = Result<Vec<Client>, StoreError>> + Send {
        ready(Ok(Self::sorted(
            self.revision.clients.values().cloned(),
            |c| c.id,
        )))
    }

    fn load_all_companies(&self) -> impl Future<Output = Result<Vec<Company>, StoreError>> + Send {
        ready(Ok(Self::sorted(
            self.revision.companies.values().cloned(),
            |c| c.id,
        )))
    }

    fn load_open_deliveries(
        &self,
    ) -> impl Future<Output = Result<Vec<DeliveryPoint>, StoreError>> + Send {
        ready(Ok(Self::sorted(
            self.revision
                .deliveries
                .iter()
                .filter(|d| d.status.is_open())
                .cloned(),
            |d| d.id,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoPoint;
    use std::io::Write;

    const DATASET: &str = r#"{
        "clients": [
            {"id": 2, "name": "Beatriz", "location": "POINT(-70.61 -33.46)"},
            {"id": 1, "name": "Ana", "location": "POINT(-70.6 -33.45)"},
            {"id": 3, "name": "Carlos", "location": null}
        ],
        "companies": [
            {"id": 1, "name": "Acme", "location": "POINT(-70.5 -33.3)", "coverage_area_ids": [1]},
            {"id": 2, "name": "Rota", "location": "POINT(-70.7 -33.5)", "coverage_area_ids": [99]}
        ],
        "coverage_areas": [
            {"id": 1, "name": "Centro",
             "polygon": "POLYGON((-70.65 -33.4,-70.55 -33.4,-70.55 -33.5,-70.65 -33.5,-70.65 -33.4))"}
        ],
        "deliveries": [
            {"id": 10, "company_id": 1, "status": "PENDING", "location": "POINT(-70.62 -33.44)"},
            {"id": 11, "company_id": 1, "status": "DELIVERED", "location": "POINT(-70.63 -33.43)"},
            {"id": 12, "company_id": 2, "status": "URGENT", "location": "POINT(-70.64 -33.42)"}
        ]
    }"#;

    fn store() -> MemoryStore {
        MemoryStore::new(Dataset::from_json(DATASET).unwrap())
    }

    #[tokio::test]
    async fn test_loads_and_not_found() {
        let reader = store().begin_read().await.unwrap();
        assert_eq!(reader.load_client(1).await.unwrap().name, "Ana");
        assert!(reader.load_client(3).await.unwrap().location.is_none());
        assert!(matches!(
            reader.load_client(42).await,
            Err(StoreError::NotFound {
                kind: EntityKind::Client,
                id: 42
            })
        ));
        assert!(matches!(
            reader.load_company(42).await,
            Err(StoreError::NotFound {
                kind: EntityKind::Company,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_bulk_loads_are_sorted() {
        let reader = store().begin_read().await.unwrap();
        let ids: Vec<i32> = reader
            .load_all_clients()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let open: Vec<i32> = reader
            .load_open_deliveries()
            .await
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(open, vec![10, 12]);
    }

    #[tokio::test]
    async fn test_dangling_area_reference_is_not_found() {
        let reader = store().begin_read().await.unwrap();
        assert_eq!(reader.load_coverage_areas_for_company(1).await.unwrap().len(), 1);
        assert!(matches!(
            reader.load_coverage_areas_for_company(2).await,
            Err(StoreError::NotFound {
                kind: EntityKind::CoverageArea,
                id: 99
            })
        ));
    }

    #[tokio::test]
    async fn test_reader_keeps_its_revision() {
        let store = store();
        let before = store.begin_read().await.unwrap();

        let moved = Client {
            id: 1,
            name: "Ana".to_string(),
            location: Some(GeoPoint::new(0.0, 0.0).unwrap()),
        };
        let revision = store.upsert_client(moved.clone()).unwrap();
        store.remove_coverage_area(1).unwrap();

        let after = store.begin_read().await.unwrap();
        assert_eq!(before.revision() + 2, after.revision());
        assert_eq!(revision, before.revision() + 1);
        assert!(after.published_at() >= before.published_at());

        assert_ne!(before.load_client(1).await.unwrap(), moved);
        assert_eq!(before.load_coverage_areas_for_company(1).await.unwrap().len(), 1);

        assert_eq!(after.load_client(1).await.unwrap(), moved);
        assert!(after.load_coverage_areas_for_company(1).await.unwrap().is_empty());
    }

    #[test]
    fn test_invalid_geometry_fails_decode() {
        let bad = r#"{"clients": [{"id": 1, "name": "x", "location": "POINT(abc def)"}]}"#;
        assert!(matches!(Dataset::from_json(bad), Err(StoreError::Decode(_))));

        let open_ring = r#"{"coverage_areas": [{"id": 1, "name": "x",
            "polygon": "POLYGON((0 0, 1 0, 1 1, 0 1))"}]}"#;
        assert!(matches!(
            Dataset::from_json(open_ring),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();
        let dataset = Dataset::load_from_file(file.path()).unwrap();
        assert_eq!(dataset.companies.len(), 2);

        assert!(matches!(
            Dataset::load_from_file("/nonexistent/dataset.json"),
            Err(StoreError::Io(_))
        ));
    }
}
