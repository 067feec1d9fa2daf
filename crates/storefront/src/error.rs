//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server faults to
//! Sentry before responding. Every response body is the browser envelope
//! `{ success: false, message }`; route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lotus_core::Envelope;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::gateway::GatewayError;

/// User-facing message for a missing or rejected login.
pub const NOT_LOGGED_IN_MESSAGE: &str = "Bạn phải đăng nhập để tiếp tục";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Checkout flow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// No usable credential on the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Gateway(e) => match e {
                GatewayError::Api { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
                GatewayError::Http(_) | GatewayError::Parse(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Checkout(e) => match e {
                CheckoutError::Unauthorized => StatusCode::UNAUTHORIZED,
                CheckoutError::MissingField { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::OrderCreate { .. } | CheckoutError::QrRequest { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the user. Gateway/checkout messages pass
    /// through verbatim; internal faults stay generic.
    fn user_message(&self) -> String {
        match self {
            Self::Gateway(e) => match e {
                GatewayError::Api { message, .. } => message.clone(),
                GatewayError::Unauthorized => NOT_LOGGED_IN_MESSAGE.to_string(),
                GatewayError::Http(_) | GatewayError::Parse(_) => {
                    lotus_core::GENERIC_FAILURE_MESSAGE.to_string()
                }
            },
            Self::Checkout(e) => e.to_string(),
            Self::Unauthorized => NOT_LOGGED_IN_MESSAGE.to_string(),
            Self::BadRequest(message) | Self::NotFound(message) => message.clone(),
            Self::Internal(_) => lotus_core::GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Gateway(GatewayError::Http(_) | GatewayError::Parse(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server faults to Sentry; client errors are just noise.
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Envelope::<()>::error(self.user_message());
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
