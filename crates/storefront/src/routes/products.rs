//! Public catalog relays.
//!
//! Products and tags are world-readable; these handlers forward to the
//! gateway without credentials and relay status and body verbatim.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::relayed;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

async fn relay_get(state: &AppState, path: &str) -> Result<Response> {
    let response = state.gateway().relay(Method::GET, path, None, None).await?;
    Ok(relayed(response))
}

/// Active product listing.
#[instrument(skip(state))]
pub async fn active(State(state): State<AppState>) -> Result<Response> {
    relay_get(&state, "/api/v1/products/active").await
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    relay_get(&state, &format!("/api/v1/products/{id}")).await
}

/// Product search by name.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let name = params
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name là bắt buộc".to_string()))?;

    relay_get(
        &state,
        &format!("/api/v1/products/search?name={}", urlencoding::encode(&name)),
    )
    .await
}

/// Products in a category.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    relay_get(&state, &format!("/api/v1/products/category/{id}")).await
}

/// Products carrying a tag.
#[instrument(skip(state))]
pub async fn by_tag(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    relay_get(&state, &format!("/api/v1/products/tag/{id}")).await
}

/// Tag listing.
#[instrument(skip(state))]
pub async fn tags(State(state): State<AppState>) -> Result<Response> {
    relay_get(&state, "/api/v1/tags").await
}

/// Tag detail.
#[instrument(skip(state))]
pub async fn tag_show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    relay_get(&state, &format!("/api/v1/tags/{id}")).await
}
