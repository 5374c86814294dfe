//! Store-owned records. The core reads snapshots of these and never mutates them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoverageError, EntityKind};
use crate::geometry::{GeoPoint, Polygon};

/// A delivery client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i32,
    pub name: String,
    /// `None` when the store has no location on file
    pub location: Option<GeoPoint>,
}

impl Client {
    /// The client as a located site, or `UnknownEntity` when it has no location.
    pub fn site(&self) -> Result<Site, CoverageError> {
        Site::require(EntityKind::Client, self.id, self.location)
    }
}

/// A delivery company and the coverage areas assigned to it.
///
/// No assigned areas means the company only covers by radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub coverage_area_ids: BTreeSet<i32>,
}

impl Company {
    pub fn site(&self) -> Result<Site, CoverageError> {
        Site::require(EntityKind::Company, self.id, self.location)
    }
}

/// A declared polygon within which a company commits to deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageArea {
    pub id: i32,
    pub name: String,
    pub polygon: Polygon,
}

/// Order lifecycle states as recorded by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Urgent,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    /// Still waiting to be delivered
    pub fn is_open(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Urgent)
    }
}

/// Destination of an order placed with a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPoint {
    pub id: i32,
    pub company_id: i32,
    pub status: DeliveryStatus,
    pub location: Option<GeoPoint>,
}

/// An identified location, the unit the resolver and ranker work on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub id: i32,
    pub location: GeoPoint,
}

impl Site {
    pub fn new(id: i32, location: GeoPoint) -> Self {
        Self { id, location }
    }

    /// Lift an optional location, surfacing a missing one as `UnknownEntity`.
    pub fn require(
        kind: EntityKind,
        id: i32,
        location: Option<GeoPoint>,
    ) -> Result<Self, CoverageError> {
        location
            .map(|location| Self { id, location })
            .ok_or(CoverageError::UnknownEntity { kind, id })
    }
}
