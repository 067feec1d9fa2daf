//! Cart route handlers.
//!
//! Each handler resolves the caller's cart session, runs the mutation
//! contract against the gateway, and answers with the reconciled view.
//! Errors are handled here, at the point of the user action — nothing is
//! rethrown to a global boundary.

use axum::{
    Json,
    extract::{Path, State},
};
use lotus_core::Envelope;
use serde::Deserialize;
use tracing::instrument;

use crate::cart::session::CartView;
use crate::error::Result;
use crate::gateway::GatewayError;
use crate::middleware::BearerToken;
use crate::state::AppState;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemForm {
    pub product_variant_id: String,
    pub quantity: Option<u32>,
}

/// Quantity-update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateItemForm {
    pub quantity: u32,
}

/// Current cart: refresh from the gateway, then render the store.
///
/// A transport failure keeps the stale view (the cart degrades, it does
/// not blank); an auth failure surfaces distinctly.
#[instrument(skip(state, token))]
pub async fn show(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<Envelope<CartView>>> {
    let session = state.carts().session(token.expose()).await;

    match session.refresh(token.expose()).await {
        Ok(()) => {}
        Err(GatewayError::Unauthorized) => return Err(GatewayError::Unauthorized.into()),
        Err(e) => tracing::warn!("cart refresh failed, serving stale view: {e}"),
    }

    Ok(Json(Envelope::ok(session.view().await)))
}

/// Add a variant to the cart.
#[instrument(skip(state, token))]
pub async fn add(
    State(state): State<AppState>,
    token: BearerToken,
    Json(form): Json<AddItemForm>,
) -> Result<Json<Envelope<CartView>>> {
    let session = state.carts().session(token.expose()).await;
    session
        .add_item(
            token.expose(),
            form.product_variant_id,
            form.quantity.unwrap_or(1),
        )
        .await?;

    Ok(Json(Envelope::ok(session.view().await)))
}

/// Update a line's quantity. Server first; local state only changes on
/// confirmation.
#[instrument(skip(state, token))]
pub async fn update(
    State(state): State<AppState>,
    token: BearerToken,
    Path(line_id): Path<String>,
    Json(form): Json<UpdateItemForm>,
) -> Result<Json<Envelope<CartView>>> {
    let session = state.carts().session(token.expose()).await;
    session
        .update_quantity(token.expose(), &line_id, form.quantity)
        .await?;

    Ok(Json(Envelope::ok(session.view().await)))
}

/// Remove a line, with the optimistic-removal fallback policy applied by
/// the session.
#[instrument(skip(state, token))]
pub async fn remove(
    State(state): State<AppState>,
    token: BearerToken,
    Path(line_id): Path<String>,
) -> Result<Json<Envelope<CartView>>> {
    let session = state.carts().session(token.expose()).await;
    session.remove_item(token.expose(), &line_id).await?;

    Ok(Json(Envelope::ok(session.view().await)))
}
