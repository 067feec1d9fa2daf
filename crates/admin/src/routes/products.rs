//! Product management relays.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    http::header::CONTENT_TYPE,
    response::Response,
};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AdminError, Result};
use crate::middleware::RequireToken;
use crate::routes::relayed;
use crate::state::AppState;

/// List query parameters. `name` routes to search, `categoryId` to the
/// category listing, otherwise the active listing is returned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub name: Option<String>,
    pub category_id: Option<String>,
}

/// Product listing with query-parameter routing.
#[instrument(skip(state, token))]
pub async fn list(
    State(state): State<AppState>,
    token: RequireToken,
    Query(params): Query<ListParams>,
) -> Result<Response> {
    let path = if let Some(name) = params.name.filter(|n| !n.trim().is_empty()) {
        format!("/api/v1/products/search?name={}", urlencoding::encode(&name))
    } else if let Some(category_id) = params.category_id {
        format!("/api/v1/products/category/{category_id}")
    } else {
        "/api/v1/products/active".to_string()
    };

    let response = state
        .gateway()
        .relay(Method::GET, &path, token.expose(), None)
        .await?;
    Ok(relayed(response))
}

/// Create a product.
#[instrument(skip(state, token, body))]
pub async fn create(
    State(state): State<AppState>,
    token: RequireToken,
    axum::Json(body): axum::Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(Method::POST, "/api/v1/products", token.expose(), Some(body))
        .await?;
    Ok(relayed(response))
}

/// Product detail.
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
            &format!("/api/v1/products/{id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Update a product.
#[instrument(skip(state, token, body))]
pub async fn update(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Delete a product.
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
            &format!("/api/v1/products/{id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Variant list for a product.
#[instrument(skip(state, token))]
pub async fn variants(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::GET,
            &format!("/api/v1/products/{id}/variants"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Create a variant under a product.
#[instrument(skip(state, token, body))]
pub async fn create_variant(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::POST,
            &format!("/api/v1/products/{id}/variants"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Variant detail.
#[instrument(skip(state, token))]
pub async fn variant_show(
    State(state): State<AppState>,
    token: RequireToken,
    Path((id, variant_id)): Path<(String, String)>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::GET,
            &format!("/api/v1/products/{id}/variants/{variant_id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Update a variant.
#[instrument(skip(state, token, body))]
pub async fn update_variant(
    State(state): State<AppState>,
    token: RequireToken,
    Path((id, variant_id)): Path<(String, String)>,
    axum::Json(body): axum::Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::PUT,
            &format!("/api/v1/products/{id}/variants/{variant_id}"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Delete a variant.
#[instrument(skip(state, token))]
pub async fn delete_variant(
    State(state): State<AppState>,
    token: RequireToken,
    Path((id, variant_id)): Path<(String, String)>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::DELETE,
            &format!("/api/v1/products/{id}/variants/{variant_id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Attach a tag to a product.
#[instrument(skip(state, token, body))]
pub async fn attach_tag(
    State(state): State<AppState>,
    token: RequireToken,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::POST,
            &format!("/api/v1/products/{id}/tags"),
            token.expose(),
            Some(body),
        )
        .await?;
    Ok(relayed(response))
}

/// Detach a tag from a product.
#[instrument(skip(state, token))]
pub async fn detach_tag(
    State(state): State<AppState>,
    token: RequireToken,
    Path((id, tag_id)): Path<(String, String)>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::DELETE,
            &format!("/api/v1/products/{id}/tags/{tag_id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}

/// Upload product images: the multipart body passes through untouched so
/// the boundary survives the hop.
#[instrument(skip(state, token, headers, body))]
pub async fn upload_images(
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
            &format!("/api/v1/products/{id}/images"),
            token.expose(),
            content_type,
            body,
        )
        .await?;
    Ok(relayed(response))
}

/// Delete a product image.
#[instrument(skip(state, token))]
pub async fn delete_image(
    State(state): State<AppState>,
    token: RequireToken,
    Path(image_id): Path<String>,
) -> Result<Response> {
    let response = state
        .gateway()
        .relay(
            Method::DELETE,
            &format!("/api/v1/products/images/{image_id}"),
            token.expose(),
            None,
        )
        .await?;
    Ok(relayed(response))
}
