//! HTTP route handlers for the storefront BFF.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (cookie issuance)
//! POST /api/auth/login                  - Forward login, set auth cookie
//! POST /api/auth/logout                 - Best-effort gateway logout, clear cookie
//! POST /api/auth/register               - Relay registration
//! GET  /api/auth/me                     - Relay profile (requires token)
//!
//! # Cart
//! GET    /api/me/cart                   - Refresh + reconciled cart view
//! POST   /api/me/cart/items             - Add a variant
//! PATCH  /api/me/cart/items/{id}        - Update line quantity
//! DELETE /api/me/cart/items/{id}        - Remove line
//!
//! # Catalog (public relays)
//! GET /api/products/active              - Active products
//! GET /api/products/search?name=        - Search by name
//! GET /api/products/category/{id}       - Products in a category
//! GET /api/products/tag/{id}            - Products with a tag
//! GET /api/products/{id}                - Product detail
//! GET /api/tags                         - Tag list
//! GET /api/tags/{id}                    - Tag detail
//!
//! # Checkout
//! POST   /api/checkout                  - Submit shipping, create order + QR
//! GET    /api/checkout/{orderId}        - Current phase
//! POST   /api/checkout/{orderId}/check  - Manual status check
//! DELETE /api/checkout/{orderId}        - Teardown (stops polling)
//!
//! # Payment
//! GET  /api/payment/status?orderId=     - Status relay
//! POST /api/sepay                       - QR request relay
//! POST /api/sepay/webhook               - Provider webhook relay (no auth)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod payment;
pub mod products;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::gateway::Relayed;
use crate::state::AppState;

/// Render a relayed gateway response: its status, its JSON body.
pub(crate) fn relayed(response: Relayed) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
}

/// Create the public catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/active", get(products::active))
        .route("/search", get(products::search))
        .route("/category/{id}", get(products::by_category))
        .route("/tag/{id}", get(products::by_tag))
        .route("/{id}", get(products::show))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route(
            "/{order_id}",
            get(checkout::status).delete(checkout::teardown),
        )
        .route("/{order_id}/check", post(checkout::check_now))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/me/cart", cart_routes())
        .nest("/api/products", product_routes())
        .nest("/api/checkout", checkout_routes())
        .route("/api/tags", get(products::tags))
        .route("/api/tags/{id}", get(products::tag_show))
        .route("/api/payment/status", get(payment::status))
        .route("/api/sepay", post(payment::request_qr))
        .route("/api/sepay/webhook", post(payment::webhook))
}
