//! Per-session cart glue: gateway mutations reconciled into the store.
//!
//! One [`CartSession`] exists per signed-in browser session (keyed by the
//! bearer token, held in a `moka` cache with idle expiry standing in for
//! the tab's lifetime). The session owns the store behind an async mutex;
//! the bearer token is never retained here — callers pass it fresh on
//! every call.

use std::sync::Arc;
use std::time::Duration;

use lotus_core::Vnd;
use moka::future::Cache;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::cart::{CartGateway, CartLineItem, CartStore, sync};
use crate::gateway::GatewayError;
use crate::gateway::types::AddCartItemRequest;

/// Idle lifetime of a cart session.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Snapshot of the cart for the browser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub subtotal: Vnd,
    /// vi-VN formatted subtotal, e.g. `125.000 ₫`.
    pub subtotal_display: String,
}

/// One user's cart session.
pub struct CartSession {
    gateway: Arc<dyn CartGateway>,
    store: tokio::sync::Mutex<CartStore>,
    /// Named policy: when the gateway rejects a delete, remove the line
    /// locally anyway so the UI does not appear stuck. Auth failures are
    /// exempt — they must surface distinctly.
    optimistic_removal: bool,
}

impl CartSession {
    /// Create a session with the default policies.
    #[must_use]
    pub fn new(gateway: Arc<dyn CartGateway>) -> Self {
        Self::with_policy(gateway, true)
    }

    /// Create a session with an explicit `optimistic_removal` policy.
    #[must_use]
    pub fn with_policy(gateway: Arc<dyn CartGateway>, optimistic_removal: bool) -> Self {
        Self {
            gateway,
            store: tokio::sync::Mutex::new(CartStore::new()),
            optimistic_removal,
        }
    }

    /// Current snapshot with derived totals.
    pub async fn view(&self) -> CartView {
        let store = self.store.lock().await;
        let subtotal = store.subtotal();
        CartView {
            items: store.items().to_vec(),
            item_count: store.item_count(),
            subtotal,
            subtotal_display: subtotal.to_string(),
        }
    }

    /// Pull authoritative state from the gateway and reconcile images.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; local state is untouched in that case.
    pub async fn refresh(&self, token: &str) -> Result<(), GatewayError> {
        let mut store = self.store.lock().await;
        sync::refresh(self.gateway.as_ref(), token, &mut store).await
    }

    /// Add a variant to the cart, then refresh to pick up the
    /// server-assigned line id.
    ///
    /// # Errors
    ///
    /// Returns an error if the add itself fails; a failed follow-up refresh
    /// is soft (the next refresh reconciles).
    #[instrument(skip(self, token))]
    pub async fn add_item(
        &self,
        token: &str,
        product_variant_id: String,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        let request = AddCartItemRequest {
            product_variant_id,
            quantity: quantity.max(1),
        };
        self.gateway.add_cart_item(token, &request).await?;

        if let Err(e) = self.refresh(token).await {
            warn!("cart refresh after add failed: {e}");
        }
        Ok(())
    }

    /// Replace a line's quantity, server first.
    ///
    /// The local store only changes once the gateway confirmed; a rejected
    /// update leaves local state exactly as it was. Quantities below 1 are
    /// a no-op without any network call.
    ///
    /// # Errors
    ///
    /// Returns the gateway error so the handler can surface it.
    #[instrument(skip(self, token))]
    pub async fn update_quantity(
        &self,
        token: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<(), GatewayError> {
        if quantity < 1 {
            return Ok(());
        }

        self.gateway
            .update_cart_item(token, line_id, quantity)
            .await?;

        let mut store = self.store.lock().await;
        store.set_quantity(line_id, quantity);
        Ok(())
    }

    /// Remove a line.
    ///
    /// On gateway success (including empty-body success) the line is
    /// removed locally. On failure the `optimistic_removal` policy decides:
    /// enabled, the line is removed locally anyway (the flagged
    /// perceived-responsiveness trade-off); disabled, the error propagates
    /// and local state is kept.
    ///
    /// # Errors
    ///
    /// Returns auth failures always; other failures only when the policy
    /// is disabled.
    #[instrument(skip(self, token))]
    pub async fn remove_item(&self, token: &str, line_id: &str) -> Result<(), GatewayError> {
        match self.gateway.remove_cart_item(token, line_id).await {
            Ok(()) => {}
            Err(GatewayError::Unauthorized) => return Err(GatewayError::Unauthorized),
            Err(e) if self.optimistic_removal => {
                warn!("cart delete failed, removing locally anyway: {e}");
            }
            Err(e) => return Err(e),
        }

        let mut store = self.store.lock().await;
        store.remove(line_id);
        Ok(())
    }
}

/// Registry of live cart sessions, keyed by bearer token.
///
/// Process-local by design: sessions are never shared across gateways, and
/// mutation happens behind each session's own mutex.
#[derive(Clone)]
pub struct CartSessions {
    sessions: Cache<String, Arc<CartSession>>,
    gateway: Arc<dyn CartGateway>,
}

impl CartSessions {
    /// Create the registry.
    #[must_use]
    pub fn new(gateway: Arc<dyn CartGateway>) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(SESSION_IDLE_TTL)
            .build();
        Self { sessions, gateway }
    }

    /// Fetch or create the session for a token.
    pub async fn session(&self, token: &str) -> Arc<CartSession> {
        let gateway = Arc::clone(&self.gateway);
        self.sessions
            .get_with(token.to_string(), async move {
                Arc::new(CartSession::new(gateway))
            })
            .await
    }

    /// Drop the session for a token (logout).
    pub async fn evict(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}
