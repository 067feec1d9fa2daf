//! Checkout route handlers.
//!
//! The submit handler runs the whole submission leg (validate, create
//! order, request QR) and registers the payment poller; the rest of the
//! handlers let the browser follow the attempt until it is paid or torn
//! down.

use axum::{
    Json,
    extract::{Path, State},
};
use lotus_core::Envelope;
use serde::Serialize;
use tracing::instrument;

use crate::checkout::{CheckoutPhase, CheckoutSession, SUCCESS_REDIRECT_DELAY_MS, ShippingDetails};
use crate::error::{AppError, Result};
use crate::middleware::BearerToken;
use crate::state::AppState;

/// Where the browser should land once the attempt is paid.
const SUCCESS_REDIRECT: &str = "/checkout/success";

/// One checkout attempt as the browser sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub qr_url: String,
    pub phase: CheckoutPhase,
    /// Present once paid: the success view plus a short render delay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_after_ms: Option<u64>,
}

impl CheckoutView {
    fn of(session: &CheckoutSession, phase: CheckoutPhase) -> Self {
        let paid = phase == CheckoutPhase::Paid;
        Self {
            order_id: session.order_id.clone(),
            order_number: session.order_number.clone(),
            qr_url: session.qr_url.clone(),
            phase,
            redirect_to: paid.then_some(SUCCESS_REDIRECT),
            redirect_after_ms: paid.then_some(SUCCESS_REDIRECT_DELAY_MS),
        }
    }
}

/// Submit the shipping form: create the order, request its QR, start
/// polling.
#[instrument(skip(state, token, shipping))]
pub async fn submit(
    State(state): State<AppState>,
    token: BearerToken,
    Json(shipping): Json<ShippingDetails>,
) -> Result<Json<Envelope<CheckoutView>>> {
    let session = state.checkouts().begin(token.expose(), &shipping).await?;
    let phase = session.phase();
    Ok(Json(Envelope::ok(CheckoutView::of(&session, phase))))
}

fn lookup(state: &AppState, order_id: &str) -> Result<std::sync::Arc<CheckoutSession>> {
    state
        .checkouts()
        .get(order_id)
        .ok_or_else(|| AppError::NotFound(format!("không có đơn thanh toán {order_id}")))
}

/// Current phase of an attempt.
#[instrument(skip(state, _token))]
pub async fn status(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<CheckoutView>>> {
    let session = lookup(&state, &order_id)?;
    let phase = session.phase();
    Ok(Json(Envelope::ok(CheckoutView::of(&session, phase))))
}

/// Manual "check status now": one out-of-band query, same transition rule
/// as the scheduled polls.
#[instrument(skip(state, _token))]
pub async fn check_now(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<CheckoutView>>> {
    let session = lookup(&state, &order_id)?;
    let phase = session.check_now().await?;
    Ok(Json(Envelope::ok(CheckoutView::of(&session, phase))))
}

/// Teardown on navigation away: stop polling, forget the attempt.
#[instrument(skip(state, _token))]
pub async fn teardown(
    State(state): State<AppState>,
    _token: BearerToken,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<()>>> {
    if state.checkouts().teardown(&order_id) {
        Ok(Json(Envelope::ok(())))
    } else {
        Err(AppError::NotFound(format!(
            "không có đơn thanh toán {order_id}"
        )))
    }
}
