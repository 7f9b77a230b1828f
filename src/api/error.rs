//! Error → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable error body; `code` is the contract, `message` is for humans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::BadInput(_) => (StatusCode::BAD_REQUEST, "BAD_INPUT"),
            Error::DriverAlreadyAssigned => (StatusCode::CONFLICT, "DRIVER_ALREADY_ASSIGNED"),
            Error::VehicleAlreadyAssigned => (StatusCode::CONFLICT, "VEHICLE_ALREADY_ASSIGNED"),
            Error::PortFailure(_) => (StatusCode::BAD_GATEWAY, "PORT_FAILURE"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Error::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Error::Internal(e) => {
                log::error!("internal error: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };

        let body = ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
