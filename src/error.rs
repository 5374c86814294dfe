//! Error types for coverage evaluation.
//!
//! Geometry, store and façade failures stay distinct so a caller can always
//! tell "could not determine coverage" apart from "not covered".

use thiserror::Error;

/// Kind of record a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Company,
    CoverageArea,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Client => write!(f, "client"),
            EntityKind::Company => write!(f, "company"),
            EntityKind::CoverageArea => write!(f, "coverage area"),
        }
    }
}

/// Geometry parsing and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Text is not of the form `POINT(<lon> <lat>)`.
    #[error("Malformed point: {0:?}")]
    MalformedPoint(String),

    /// Coordinates outside longitude [-180, 180] or latitude [-90, 90].
    #[error("Coordinates out of range: lon={lon}, lat={lat}")]
    OutOfRange { lon: f64, lat: f64 },

    /// Ring with fewer than 4 points or whose first point differs from its last.
    #[error("Invalid ring: {0}")]
    InvalidRing(String),

    /// Text is not of the form `POLYGON((<lon> <lat>, ...))`.
    #[error("Malformed polygon: {0:?}")]
    MalformedPolygon(String),
}

/// Failures raised by a data store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    /// The store could not be reached or refused the read.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded into records.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Caller-facing failures of the query façade.
#[derive(Error, Debug)]
pub enum CoverageError {
    /// Non-positive id, negative or non-finite radius, negative limit.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    /// The record exists but carries no location.
    #[error("{kind} {id} has no location")]
    UnknownEntity { kind: EntityKind, id: i32 },

    /// Data access failed; coverage could not be determined.
    #[error("Data access failed: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CoverageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => CoverageError::NotFound { kind, id },
            other => CoverageError::Store(other),
        }
    }
}

/// Result type for façade operations.
pub type Result<T> = std::result::Result<T, CoverageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: CoverageError = StoreError::NotFound {
            kind: EntityKind::Client,
            id: 7,
        }
        .into();
        assert!(matches!(
            err,
            CoverageError::NotFound {
                kind: EntityKind::Client,
                id: 7
            }
        ));
        assert_eq!(err.to_string(), "client 7 not found");
    }

    #[test]
    fn test_store_failure_stays_a_store_error() {
        let err: CoverageError = StoreError::Unavailable("connection reset".into()).into();
        assert!(matches!(err, CoverageError::Store(StoreError::Unavailable(_))));
    }
}
