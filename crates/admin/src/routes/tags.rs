//! Tag management relays.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireToken;
use crate::routes::relayed;
use crate::state::AppState;

/// Tag listing.
#[instrument(skip(state, token))]
pub async fn list(State(state): State<AppState>, token: RequireToken) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::GET, "/api/v1/tags", token.expose(), None)
        .await?;
    Ok(relayed(response))
}

/// Create a tag.
#[instrument(skip(state, token, body))]
pub async fn create(
    State(state): State<AppState>,
    token: RequireToken,
    Json(body): Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/tags", token.expose(), Some(body))
        .await?;
    Ok(relayed(response))
}

/// Update a tag.
#[instrument(skip(state, token, body))]
pub async fn update(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::PUT,
            &format!("/api/v1/tags/{id}"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Delete a tag.
#[instrument(skip(state, token))]
pub async fn destroy(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::DELETE,
            &format!("/api/v1/tags/{id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}
