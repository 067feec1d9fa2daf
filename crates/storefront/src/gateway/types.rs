//! Wire types for the gateway REST contract.
//!
//! Field names mirror the gateway's camelCase JSON exactly. These types are
//! decode targets only; the browser-facing shapes live with the routes.

use lotus_core::{PaymentStatus, Vnd};
use serde::{Deserialize, Serialize};

/// `GET /api/v1/me/cart` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CartPayload {
    #[serde(default)]
    pub items: Vec<CartLineWire>,
}

/// One cart line as the gateway returns it.
///
/// The gateway has shipped the image under several keys over time; all are
/// accepted, the first present wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineWire {
    pub id: String,
    pub product_name: String,
    pub unit_price: Vnd,
    pub quantity: u32,
    #[serde(default)]
    pub product_variant_id: Option<String>,
    #[serde(
        default,
        alias = "thumbnail",
        alias = "productImageUrl",
        alias = "image"
    )]
    pub image_url: Option<String>,
}

/// `POST /api/v1/me/cart/items` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_variant_id: String,
    pub quantity: u32,
}

/// `PATCH /api/v1/me/cart/items/{id}` request body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// One product from the active catalog, reduced to what image enrichment
/// needs: every variant id plus the product's image list.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

/// A purchasable variant reference inside a catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVariant {
    pub id: String,
}

/// `POST /api/v1/orders` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// `POST /api/v1/sepay` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub qr_url: String,
}

/// `GET /api/v1/payment/status` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusPayload {
    pub payment_status: PaymentStatus,
}

/// `POST /api/v1/auth/login` payload.
///
/// The access token is peeled off into the session cookie; everything else
/// is handed back to the browser untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub user: serde_json::Map<String, serde_json::Value>,
}
