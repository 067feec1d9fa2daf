//! Checkout order/payment orchestration.
//!
//! The flow is a small state machine:
//! `FORM -> SUBMITTING -> AWAITING_PAYMENT -> PAID`, where submission
//! failure returns to the editable form and teardown stops all polling.
//! Submission ([`place_order`]) runs the two sequential gateway calls;
//! the polling side lives in [`watcher`]; live checkouts are registered in
//! [`sessions`].

pub mod sessions;
pub mod watcher;

use async_trait::async_trait;
use lotus_core::PaymentStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::gateway::GatewayError;
use crate::gateway::types::{OrderCreated, QrCode};

pub use sessions::{CheckoutSession, CheckoutSessions};
pub use watcher::{PaymentWatcher, POLL_INTERVAL};

/// Delay before the success view navigates away, so the confirmation can
/// render first. Surfaced to the browser alongside the `PAID` phase.
pub const SUCCESS_REDIRECT_DELAY_MS: u64 = 1500;

/// Fallback messages when the gateway fails without one.
const ORDER_CREATE_FALLBACK: &str = "Tạo đơn hàng thất bại";
const QR_REQUEST_FALLBACK: &str = "Tạo QR thanh toán thất bại";

/// The gateway surface the checkout flow depends on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order from the shipping payload.
    async fn create_order(
        &self,
        token: &str,
        shipping: &ShippingDetails,
    ) -> Result<OrderCreated, GatewayError>;

    /// Request a payment QR for an existing order.
    async fn request_payment_qr(&self, token: &str, order_id: &str)
    -> Result<QrCode, GatewayError>;

    /// Query the payment status of an order.
    async fn payment_status(
        &self,
        token: &str,
        order_id: &str,
    ) -> Result<PaymentStatus, GatewayError>;
}

/// Shipping details collected by the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone_number: String,
    pub city: String,
    pub ward: String,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ShippingDetails {
    /// Check that every required field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns the first missing field; no network call may be issued when
    /// this fails.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("fullName", &self.full_name),
            ("phoneNumber", &self.phone_number),
            ("city", &self.city),
            ("ward", &self.ward),
            ("street", &self.street),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField { field });
            }
        }
        Ok(())
    }
}

/// Phases of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutPhase {
    /// Collecting shipping info.
    Form,
    /// Order creation and QR request in flight.
    Submitting,
    /// QR shown, polling active.
    AwaitingPayment,
    /// Terminal: payment confirmed, polling stopped for good.
    Paid,
}

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required shipping field was empty. Caught before any network call.
    #[error("thiếu thông tin bắt buộc: {field}")]
    MissingField {
        /// camelCase field name, as the form knows it.
        field: &'static str,
    },

    /// Order creation failed; the flow returns to the form.
    #[error("{message}")]
    OrderCreate {
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// QR request failed after the order was created. The order is not
    /// rolled back (an external-system concern) and its id is discarded
    /// from the flow state.
    #[error("{message}")]
    QrRequest {
        /// Server-provided message, or the generic fallback.
        message: String,
    },

    /// The gateway rejected the bearer token.
    #[error("bạn phải đăng nhập để tiếp tục đặt hàng")]
    Unauthorized,
}

/// Result of a successful submission: the created order plus its QR.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderCreated,
    pub qr_url: String,
}

fn submit_error(
    error: GatewayError,
    fallback: &str,
    wrap: fn(String) -> CheckoutError,
) -> CheckoutError {
    match error {
        GatewayError::Unauthorized => CheckoutError::Unauthorized,
        GatewayError::Api { message, .. } => wrap(message),
        GatewayError::Http(_) | GatewayError::Parse(_) => wrap(fallback.to_string()),
    }
}

/// Run the submission leg: validate, create the order, request its QR.
///
/// The two gateway calls are strictly sequential — the QR request needs
/// the order id from the first call, so it is never issued before the
/// first resolves.
///
/// # Errors
///
/// Any failure returns the flow to `FORM` with a user-facing message; a
/// created order is intentionally not rolled back on QR failure.
#[instrument(skip(gateway, token, shipping))]
pub async fn place_order<G: PaymentGateway + ?Sized>(
    gateway: &G,
    token: &str,
    shipping: &ShippingDetails,
) -> Result<PlacedOrder, CheckoutError> {
    shipping.validate()?;

    let order = gateway.create_order(token, shipping).await.map_err(|e| {
        submit_error(e, ORDER_CREATE_FALLBACK, |message| {
            CheckoutError::OrderCreate { message }
        })
    })?;

    let qr = gateway
        .request_payment_qr(token, &order.id)
        .await
        .map_err(|e| {
            submit_error(e, QR_REQUEST_FALLBACK, |message| CheckoutError::QrRequest {
                message,
            })
        })?;

    Ok(PlacedOrder {
        order,
        qr_url: qr.qr_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedGateway {
        calls: AtomicUsize,
        order: Mutex<Option<Result<OrderCreated, GatewayError>>>,
        qr: Mutex<Option<Result<QrCode, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(
            order: Result<OrderCreated, GatewayError>,
            qr: Result<QrCode, GatewayError>,
        ) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                order: Mutex::new(Some(order)),
                qr: Mutex::new(Some(qr)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn create_order(
            &self,
            _token: &str,
            _shipping: &ShippingDetails,
        ) -> Result<OrderCreated, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order
                .lock()
                .expect("lock")
                .take()
                .expect("create_order scripted once")
        }

        async fn request_payment_qr(
            &self,
            _token: &str,
            _order_id: &str,
        ) -> Result<QrCode, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.qr
                .lock()
                .expect("lock")
                .take()
                .expect("request_payment_qr scripted once")
        }

        async fn payment_status(
            &self,
            _token: &str,
            _order_id: &str,
        ) -> Result<PaymentStatus, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PaymentStatus::Pending)
        }
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            full_name: "Nguyen Van A".to_string(),
            phone_number: "0900000000".to_string(),
            city: "Hà Nội".to_string(),
            ward: "Phường X".to_string(),
            street: "123 Lê Lợi".to_string(),
            note: None,
        }
    }

    fn order_ok() -> Result<OrderCreated, GatewayError> {
        Ok(OrderCreated {
            id: "o1".to_string(),
            order_number: Some("ORD001".to_string()),
        })
    }

    fn qr_ok() -> Result<QrCode, GatewayError> {
        Ok(QrCode {
            qr_url: "https://pay.example/qr.png".to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_field_issues_no_network_call() {
        let gateway = ScriptedGateway::new(order_ok(), qr_ok());
        let mut details = shipping();
        details.ward = String::new();

        let err = place_order(&gateway, "tok", &details)
            .await
            .expect_err("validation must fail");

        assert!(matches!(err, CheckoutError::MissingField { field: "ward" }));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_happy_path_captures_order_and_qr() {
        let gateway = ScriptedGateway::new(order_ok(), qr_ok());

        let placed = place_order(&gateway, "tok", &shipping())
            .await
            .expect("submission should succeed");

        assert_eq!(placed.order.id, "o1");
        assert_eq!(placed.order.order_number.as_deref(), Some("ORD001"));
        assert_eq!(placed.qr_url, "https://pay.example/qr.png");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_qr_failure_surfaces_server_message_and_discards_order() {
        let gateway = ScriptedGateway::new(
            order_ok(),
            Err(GatewayError::Api {
                status: 502,
                message: "QR provider down".to_string(),
            }),
        );

        let err = place_order(&gateway, "tok", &shipping())
            .await
            .expect_err("qr failure must fail the submission");

        match err {
            CheckoutError::QrRequest { message } => assert_eq!(message, "QR provider down"),
            other => panic!("expected QrRequest, got {other:?}"),
        }
        // Both calls ran (order create succeeded), but no further QR retry.
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_order_failure_uses_fallback_when_message_absent() {
        let gateway = ScriptedGateway::new(
            Err(GatewayError::Api {
                status: 500,
                message: lotus_core::GENERIC_FAILURE_MESSAGE.to_string(),
            }),
            qr_ok(),
        );

        let err = place_order(&gateway, "tok", &shipping())
            .await
            .expect_err("order failure must fail the submission");
        assert!(matches!(err, CheckoutError::OrderCreate { .. }));
        // The QR request is never issued when order creation fails.
        assert_eq!(gateway.call_count(), 1);
    }
}
