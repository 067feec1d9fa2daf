//! Admin error handling.
//!
//! The admin console relays gateway responses verbatim, so the only
//! errors this layer produces itself are transport failures and bad
//! requests. Server faults are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lotus_core::Envelope;
use thiserror::Error;

use crate::gateway::AdminGatewayError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Relay failed at the transport level.
    #[error("Gateway error: {0}")]
    Gateway(#[from] AdminGatewayError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Gateway(e) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "Gateway relay error"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    lotus_core::GENERIC_FAILURE_MESSAGE.to_string(),
                )
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        (status, Json(Envelope::<()>::error(message))).into_response()
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;
