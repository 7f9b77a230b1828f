//! External collaborator ports.
//!
//! These are intentionally minimal. Concrete adapters live in their own
//! modules (`osrm`, `haversine`, `geocode`); the transactional `Store` port
//! has its own module tree under `store/`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::Coordinates;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    /// The port is not configured for this deployment.
    #[error("port not configured")]
    Unavailable,
}

/// Resolves a free-form street address to coordinates, best effort.
///
/// `Ok(None)` means the service answered but with no confident match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, PortError>;
}

/// Provides pairwise driving times in seconds for a set of locations.
///
/// The matrix is square and indexed by the provided location order, with a
/// zero diagonal. Callers decide how to recover from failure; the sequence
/// optimizer falls back to a great-circle estimate.
#[async_trait]
pub trait TimeMatrixProvider: Send + Sync {
    async fn matrix(&self, locations: &[(f64, f64)]) -> Result<Vec<Vec<i64>>, PortError>;
}

/// Source of "today" for driver-facing queries.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation of [`Clock`] in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
