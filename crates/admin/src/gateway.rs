//! Admin relay client.
//!
//! The admin console is pure proxy: every operation forwards to the
//! gateway with the operator's token and relays status and body back.
//! The only reshaping is normalizing empty success bodies (the gateway
//! answers `204 No Content` on several mutations) into the browser
//! envelope, and wrapping unparseable text as `{ "raw": .. }`.

use std::time::Duration;

use axum::body::Bytes;
use lotus_core::Envelope;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::instrument;

use crate::config::AdminConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the relay client. Gateway-reported failures are not errors
/// here — their status and body are relayed verbatim.
#[derive(Debug, Error)]
pub enum AdminGatewayError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Envelope serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A relayed gateway response.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Relay client for the admin endpoints.
#[derive(Clone)]
pub struct AdminGateway {
    client: reqwest::Client,
    base_url: String,
}

impl AdminGateway {
    /// Create a new relay client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self, AdminGatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.gateway_base_url.clone(),
        })
    }

    /// Forward a JSON request and relay the response.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    #[instrument(skip(self, token, body), fields(path = %path))]
    pub async fn relay(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Relayed, AdminGatewayError> {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        self.finish(request).await
    }

    /// Forward a raw body (multipart image upload) preserving the caller's
    /// content type, so the multipart boundary survives the hop.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    #[instrument(skip(self, token, content_type, body), fields(path = %path))]
    pub async fn relay_raw(
        &self,
        method: Method,
        path: &str,
        token: &str,
        content_type: Option<HeaderValue>,
        body: Bytes,
    ) -> Result<Relayed, AdminGatewayError> {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .body(body);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        self.finish(request).await
    }

    async fn finish(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Relayed, AdminGatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if text.is_empty() {
            // 204 No Content (and friends) normalized for the browser:
            // a success envelope on a plain 200.
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
}
