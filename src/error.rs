//! Caller-facing error taxonomy.
//!
//! Every failure that crosses the operation boundary maps to one of these
//! variants; the HTTP layer translates them to status codes and stable error
//! codes. Store and port errors are folded in via `From` so handlers can use
//! `?` throughout.

use thiserror::Error;

use crate::ports::PortError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or mismatched principal.
    #[error("unauthenticated")]
    Unauthenticated,

    /// A referenced entity is absent. The payload names the entity kind.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed or inconsistent caller input.
    #[error("bad input: {0}")]
    BadInput(String),

    /// The driver already holds another route on the same date.
    #[error("driver is already assigned to another route on this date")]
    DriverAlreadyAssigned,

    /// The vehicle already holds another route on the same date.
    #[error("vehicle is already assigned to another route on this date")]
    VehicleAlreadyAssigned,

    /// An external port failed and no fallback applies.
    #[error("port failure: {0}")]
    PortFailure(String),

    /// Concurrent mutation detected; the transaction was rolled back.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller-supplied deadline elapsed; no partial state persists.
    #[error("operation timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Error::Conflict(msg),
            StoreError::Backend(e) => Error::Internal(e),
        }
    }
}

impl From<PortError> for Error {
    fn from(err: PortError) -> Self {
        Error::PortFailure(err.to_string())
    }
}
