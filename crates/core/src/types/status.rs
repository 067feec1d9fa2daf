//! Payment status as reported by the gateway.

use serde::{Deserialize, Serialize};

/// Payment status of an order.
///
/// Only two states are observed client-side; the gateway is the source of
/// truth. Once `Success` is observed for an order, polling stops and is
/// never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment has not been confirmed yet.
    Pending,
    /// Payment confirmed by the provider.
    Success,
}

impl PaymentStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}
