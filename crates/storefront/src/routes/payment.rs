//! Payment relays.
//!
//! Thin passthroughs to the payment provider's endpoints on the gateway:
//! a status query for out-of-band checks, a standalone QR request, and
//! the provider's webhook (which carries no user credential).

use axum::{
    Json,
    extract::{Query, State},
    response::Response,
};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::OptionalToken;
use crate::routes::relayed;
use crate::state::AppState;

/// Status query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub order_id: Option<String>,
}

/// Relay a payment status query.
#[instrument(skip(state, token))]
pub async fn status(
    State(state): State<AppState>,
    token: OptionalToken,
    Query(params): Query<StatusParams>,
) -> Result<Response> {
    let order_id = params
        .order_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("orderId is required".to_string()))?;

    let response = state
        .gateway()
        .relay(
            Method::GET,
            &format!("/api/v1/payment/status?orderId={}", urlencoding::encode(&order_id)),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Relay a standalone QR request.
#[instrument(skip(state, token, body))]
pub async fn request_qr(
    State(state): State<AppState>,
    token: OptionalToken,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/sepay", token.expose(), Some(body))
        .await?;
    Ok(relayed(response))
}

/// Relay the payment provider's webhook. No user credential is attached;
/// the gateway authenticates the provider itself.
#[instrument(skip(state, body))]
pub async fn webhook(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/sepay/webhook", None, Some(body))
        .await?;
    Ok(relayed(response))
}
