//! Gateway REST client.
//!
//! All domain data lives in the external backend gateway (`/api/v1/...`);
//! this client forwards JSON requests with `reqwest`, attaches the caller's
//! bearer token, and collapses the `{ data?, message?, success? }` envelope
//! into typed results at the boundary. The active-product catalog is cached
//! with `moka` (60-second TTL) because image enrichment re-reads it on every
//! cart refresh.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lotus_core::{Envelope, Outcome, PaymentStatus};
use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::cart::CartGateway;
use crate::checkout::{PaymentGateway, ShippingDetails};
use crate::config::GatewayConfig;

use types::{
    AddCartItemRequest, CartLineWire, CartPayload, CatalogProduct, LoginData, OrderCreated,
    PaymentStatusPayload, QrCode, UpdateQuantityRequest,
};

/// Request timeout for every gateway call. A hung request must surface as a
/// user-visible error rather than suspend the handler indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const CATALOG_CACHE_KEY: &str = "catalog:active";
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);

const LOGIN_FALLBACK: &str = "Sai tên đăng nhập hoặc mật khẩu";

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a failure envelope or status.
    #[error("gateway error ({status}): {message}")]
    Api {
        /// HTTP status the gateway answered with.
        status: u16,
        /// Message to surface to the user.
        message: String,
    },

    /// The gateway rejected the bearer token (401/403).
    #[error("not authenticated")]
    Unauthorized,

    /// A success response could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A verbatim gateway response for the uniform proxy endpoints.
#[derive(Debug, Clone)]
pub struct Relayed {
    /// Gateway HTTP status, relayed unchanged.
    pub status: u16,
    /// Gateway JSON body; unparseable text is wrapped as `{ "raw": .. }`.
    pub body: serde_json::Value,
}

/// Client for the backend gateway.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog: Cache<&'static str, Arc<Vec<CatalogProduct>>>,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(GatewayClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                catalog,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the raw status plus body text.
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, String), GatewayError> {
        let mut request = self.inner.client.request(method, self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    /// Execute a call whose success case carries `data`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<T, GatewayError> {
        let (status, text) = self.send(method, path, token, body).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized);
        }

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(GatewayError::Parse(e)),
            // A failure status with an unparseable body still fails cleanly.
            Err(_) => {
                return Err(GatewayError::Api {
                    status: status.as_u16(),
                    message: lotus_core::GENERIC_FAILURE_MESSAGE.to_string(),
                });
            }
        };

        match envelope.into_outcome(status.as_u16()) {
            Outcome::Ok(data) => Ok(data),
            Outcome::Err { message, status } => Err(GatewayError::Api { status, message }),
        }
    }

    /// Execute a mutation where an empty 2xx body counts as success.
    ///
    /// PATCH and DELETE on cart lines answer `204`/empty bodies routinely;
    /// that must be treated as success, not a parse error.
    async fn call_empty_ok(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<(), GatewayError> {
        let (status, text) = self.send(method, path, token, body).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized);
        }

        if status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                && envelope.success == Some(false)
            {
                return Err(GatewayError::Api {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| {
                            lotus_core::GENERIC_FAILURE_MESSAGE.to_string()
                        }),
                });
            }
            return Ok(());
        }

        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| lotus_core::GENERIC_FAILURE_MESSAGE.to_string());
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Forward a request verbatim and relay the gateway's status and body.
    ///
    /// This is the uniform proxy mode: no reshaping beyond wrapping
    /// unparseable or empty bodies so the browser always receives JSON.
    #[instrument(skip(self, token, body), fields(path = %path))]
    pub async fn relay(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<Relayed, GatewayError> {
        let (status, text) = self.send(method, path, token, body.as_ref()).await?;

        if text.is_empty() {
            // An empty success body (204 and friends) is normalized to a
            // plain 200 with a success envelope so the browser always
            // receives JSON.
            return Ok(if status.is_success() {
                Relayed {
                    status: 200,
                    body: serde_json::json!({ "success": true, "data": null }),
                }
            } else {
                Relayed {
                    status: status.as_u16(),
                    body: serde_json::to_value(Envelope::<()>::error(
                        lotus_core::GENERIC_FAILURE_MESSAGE,
                    ))?,
                }
            });
        }

        Ok(Relayed {
            status: status.as_u16(),
            body: serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::json!({ "raw": text })),
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in against the gateway and return the token-bearing payload.
    ///
    /// Handled outside [`Self::call`]: a 401 here means invalid
    /// credentials, and the gateway's own message must pass through
    /// instead of the blanket "not logged in" mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the call fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData, GatewayError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let (status, text) = self
            .send(Method::POST, "/api/v1/auth/login", None, Some(&body))
            .await?;

        let envelope: Envelope<LoginData> =
            serde_json::from_str(&text).unwrap_or_else(|_| Envelope::error(LOGIN_FALLBACK));
        match envelope.into_outcome(status.as_u16()) {
            Outcome::Ok(data) if data.access_token.is_some() => Ok(data),
            Outcome::Ok(_) => Err(GatewayError::Api {
                status: 401,
                message: "Không nhận được token đăng nhập".to_string(),
            }),
            Outcome::Err { message, status } => Err(GatewayError::Api { status, message }),
        }
    }

    /// Invalidate the token server-side. Best effort; callers may ignore
    /// the result since the cookie is cleared regardless.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), GatewayError> {
        self.call_empty_ok(Method::POST, "/api/v1/auth/logout", Some(token), None)
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the active product catalog, cached for a short TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fetch fails and no cached copy exists.
    #[instrument(skip(self))]
    pub async fn active_catalog_cached(&self) -> Result<Arc<Vec<CatalogProduct>>, GatewayError> {
        if let Some(products) = self.inner.catalog.get(CATALOG_CACHE_KEY).await {
            debug!("cache hit for active catalog");
            return Ok(products);
        }

        let products: Vec<CatalogProduct> = self
            .call(Method::GET, "/api/v1/products/active", None, None)
            .await?;
        let products = Arc::new(products);

        self.inner
            .catalog
            .insert(CATALOG_CACHE_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }
}

// =============================================================================
// Seam trait implementations
// =============================================================================

#[async_trait]
impl CartGateway for GatewayClient {
    async fn fetch_cart(&self, token: &str) -> Result<Vec<CartLineWire>, GatewayError> {
        let payload: CartPayload = self
            .call(Method::GET, "/api/v1/me/cart", Some(token), None)
            .await?;
        Ok(payload.items)
    }

    async fn active_catalog(&self) -> Result<Arc<Vec<CatalogProduct>>, GatewayError> {
        self.active_catalog_cached().await
    }

    async fn add_cart_item(
        &self,
        token: &str,
        request: &AddCartItemRequest,
    ) -> Result<(), GatewayError> {
        let body = serde_json::to_value(request)?;
        self.call_empty_ok(
            Method::POST,
            "/api/v1/me/cart/items",
            Some(token),
            Some(&body),
        )
        .await
    }

    async fn update_cart_item(
        &self,
        token: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let body = serde_json::to_value(UpdateQuantityRequest { quantity })?;
        self.call_empty_ok(
            Method::PATCH,
            &format!("/api/v1/me/cart/items/{line_id}"),
            Some(token),
            Some(&body),
        )
        .await
    }

    async fn remove_cart_item(&self, token: &str, line_id: &str) -> Result<(), GatewayError> {
        self.call_empty_ok(
            Method::DELETE,
            &format!("/api/v1/me/cart/items/{line_id}"),
            Some(token),
            None,
        )
        .await
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn create_order(
        &self,
        token: &str,
        shipping: &ShippingDetails,
    ) -> Result<OrderCreated, GatewayError> {
        let body = serde_json::to_value(shipping)?;
        self.call(Method::POST, "/api/v1/orders", Some(token), Some(&body))
            .await
    }

    async fn request_payment_qr(&self, token: &str, order_id: &str) -> Result<QrCode, GatewayError> {
        let body = serde_json::json!({ "orderId": order_id });
        self.call(Method::POST, "/api/v1/sepay", Some(token), Some(&body))
            .await
    }

    async fn payment_status(
        &self,
        token: &str,
        order_id: &str,
    ) -> Result<PaymentStatus, GatewayError> {
        let payload: PaymentStatusPayload = self
            .call(
                Method::GET,
                &format!("/api/v1/payment/status?orderId={order_id}"),
                Some(token),
                None,
            )
            .await?;
        Ok(payload.payment_status)
    }
}
