//! Delivery coverage - geometric evaluation engine for a delivery network
//!
//! Decides whether a client falls inside a company's service coverage and
//! ranks locations by geodesic proximity. Records come from a [`store`];
//! [`service::CoverageService`] is the entry point for callers.

pub mod coverage;
pub mod error;
pub mod geometry;
pub mod models;
pub mod ranking;
pub mod service;
pub mod store;

pub use error::{CoverageError, EntityKind, GeometryError, StoreError};
pub use geometry::{GeoPoint, Polygon};
pub use models::{Client, Company, CoverageArea, CoverageResult, DeliveryPoint, Ranked};
pub use service::CoverageService;
