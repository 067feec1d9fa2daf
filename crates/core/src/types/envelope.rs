//! The gateway JSON response envelope.
//!
//! Every gateway response is wrapped as `{ data?, message?, success? }`.
//! Absence of `data` or a non-2xx status is the uniform failure signal,
//! independent of HTTP status code nuances. [`Envelope::into_outcome`]
//! collapses that loose shape into a typed [`Outcome`] at the boundary so
//! internal logic never re-checks optional-field presence.

use serde::{Deserialize, Serialize};

/// Fallback message used when the gateway reports a failure without one.
pub const GENERIC_FAILURE_MESSAGE: &str = "Đã có lỗi xảy ra, vui lòng thử lại";

/// The loose wire envelope as the gateway sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Payload; present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message; usually present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Explicit success flag; not all endpoints set it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl<T> Envelope<T> {
    /// An error envelope with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            success: Some(false),
        }
    }

    /// A success envelope wrapping `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            success: Some(true),
        }
    }

    /// Collapse the envelope plus its HTTP status into a typed outcome.
    ///
    /// `data` present on a 2xx status is the only success case; everything
    /// else is an error carrying the envelope `message` when the gateway
    /// provided one, or the generic fallback otherwise.
    pub fn into_outcome(self, status: u16) -> Outcome<T> {
        let ok_status = (200..300).contains(&status);
        match self.data {
            Some(data) if ok_status && self.success != Some(false) => Outcome::Ok(data),
            _ => Outcome::Err {
                message: self
                    .message
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
                status,
            },
        }
    }
}

/// Typed result of a gateway call, decided once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The gateway returned `data` on a success status.
    Ok(T),
    /// Transport-level success but a gateway-reported failure.
    Err {
        /// Message to surface to the user, verbatim from the gateway when
        /// present.
        message: String,
        /// HTTP status the gateway answered with.
        status: u16,
    },
}

impl<T> Outcome<T> {
    /// Whether this outcome carries data.
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}
