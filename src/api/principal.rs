//! Authenticated principal, injected by the identity gateway.
//!
//! Identity and session management live outside this service; by the time a
//! request arrives the gateway has validated the token and stamped the
//! principal onto trusted headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::Error;

const KIND_HEADER: &str = "x-principal-kind";
const ID_HEADER: &str = "x-principal-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Admin(Uuid),
    Driver(Uuid),
}

impl Principal {
    /// The admin identity, or `Unauthenticated` for anyone else.
    pub fn require_admin(self) -> Result<Uuid, Error> {
        match self {
            Principal::Admin(id) => Ok(id),
            Principal::Driver(_) => Err(Error::Unauthenticated),
        }
    }

    /// The driver identity, or `Unauthenticated` for anyone else.
    pub fn require_driver(self) -> Result<Uuid, Error> {
        match self {
            Principal::Driver(id) => Ok(id),
            Principal::Admin(_) => Err(Error::Unauthenticated),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let kind = header(parts, KIND_HEADER)?;
        let id: Uuid = header(parts, ID_HEADER)?
            .parse()
            .map_err(|_| Error::Unauthenticated)?;

        match kind.as_str() {
            "admin" => Ok(Principal::Admin(id)),
            "driver" => Ok(Principal::Driver(id)),
            _ => Err(Error::Unauthenticated),
        }
    }
}

fn header(parts: &Parts, name: &str) -> Result<String, Error> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or(Error::Unauthenticated)
}
