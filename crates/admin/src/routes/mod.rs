//! Admin HTTP route handlers.
//!
//! Every route requires the operator token and relays to the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/admin/products                              - List (name= -> search, categoryId= -> category)
//! POST   /api/admin/products                              - Create
//! GET    /api/admin/products/{id}                         - Detail
//! PUT    /api/admin/products/{id}                         - Update
//! DELETE /api/admin/products/{id}                         - Delete
//! GET    /api/admin/products/{id}/variants                - Variant list
//! POST   /api/admin/products/{id}/variants                - Create variant
//! GET    /api/admin/products/{id}/variants/{variant_id}   - Variant detail
//! PUT    /api/admin/products/{id}/variants/{variant_id}   - Update variant
//! DELETE /api/admin/products/{id}/variants/{variant_id}   - Delete variant
//! POST   /api/admin/products/{id}/tags                    - Attach tag
//! DELETE /api/admin/products/{id}/tags/{tag_id}           - Detach tag
//! POST   /api/admin/products/{id}/images                  - Upload images (multipart passthrough)
//! DELETE /api/admin/products/images/{image_id}            - Delete image
//! GET    /api/admin/categories                            - List
//! POST   /api/admin/categories                            - Create
//! GET    /api/admin/categories/{id}                       - Detail
//! PUT    /api/admin/categories/{id}                       - Update
//! DELETE /api/admin/categories/{id}                       - Delete
//! POST   /api/admin/categories/{id}/image                 - Upload image (multipart passthrough)
//! GET    /api/admin/tags                                  - List
//! POST   /api/admin/tags                                  - Create
//! PUT    /api/admin/tags/{id}                             - Update
//! DELETE /api/admin/tags/{id}                             - Delete
//! ```

pub mod categories;
pub mod products;
pub mod tags;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::gateway::Relayed;
use crate::state::AppState;

/// Render a relayed gateway response: its status, its JSON body.
pub(crate) fn relayed(response: Relayed) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

/// Create the product management router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/images/{image_id}", delete(products::delete_image))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/{id}/variants",
            get(products::variants).post(products::create_variant),
        )
        .route(
            "/{id}/variants/{variant_id}",
            get(products::variant_show)
                .put(products::update_variant)
                .delete(products::delete_variant),
        )
        .route("/{id}/tags", post(products::attach_tag))
        .route("/{id}/tags/{tag_id}", delete(products::detach_tag))
        .route("/{id}/images", post(products::upload_images))
}

/// Create the category management router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/{id}/image", post(categories::upload_image))
}

/// Create the tag management router.
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list).post(tags::create))
        .route("/{id}", axum::routing::put(tags::update).delete(tags::destroy))
}

/// Create all routes for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/admin/products", product_routes())
        .nest("/api/admin/categories", category_routes())
        .nest("/api/admin/tags", tag_routes())
}
