//! Records supplied by the data store and the results computed from them.

pub mod record;
pub mod result;

pub use record::{Client, Company, CoverageArea, DeliveryPoint, DeliveryStatus, Site};
pub use result::{CoverageResult, Ranked};
