//! Category management relays.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    http::header::CONTENT_TYPE,
    response::Response,
};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AdminError, Result};
use crate::middleware::RequireToken;
use crate::routes::relayed;
use crate::state::AppState;

/// Category listing.
#[instrument(skip(state, token))]
pub async fn list(State(state): State<AppState>, token: RequireToken) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::GET, "/api/v1/categories", token.expose(), None)
        .await?;
    Ok(relayed(response))
}

/// Create a category.
#[instrument(skip(state, token, body))]
pub async fn create(
    State(state): State<AppState>,
    token: RequireToken,
    Json(body): Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/categories", token.expose(), Some(body))
        .await?;
    Ok(relayed(response))
}

/// Category detail.
#[instrument(skip(state, token))]
pub async fn show(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::GET,
            &format!("/api/v1/categories/{id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Update a category.
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
            &format!("/api/v1/categories/{id}"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Delete a category.
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
            &format!("/api/v1/categories/{id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Upload a category image (multipart passthrough).
#[instrument(skip(state, token, headers, body))]
pub async fn upload_image(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if body.is_empty() {
        return Err(AdminError::BadRequest(
            "Không có file nào được upload".to_string(),
        ));
    }

    let content_type = headers.get(CONTENT_TYPE).cloned();
    let response = state
        .gateway()
        .relay_raw(
            Method::POST,
            &format!("/api/v1/categories/{id}/image"),
            token.expose(),
            content_type,
            body,
        )
        .await?;
    Ok(relayed(response))
}
