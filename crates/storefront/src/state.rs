//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartSessions;
use crate::checkout::CheckoutSessions;
use crate::config::StorefrontConfig;
use crate::gateway::{GatewayClient, GatewayError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns the gateway client and the two
/// process-local registries (cart sessions, live checkouts).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: GatewayClient,
    carts: CartSessions,
    checkouts: CheckoutSessions,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, GatewayError> {
        let gateway = GatewayClient::new(&config.gateway)?;
        let shared = Arc::new(gateway.clone());

        let carts = CartSessions::new(shared.clone());
        let checkouts = CheckoutSessions::new(shared);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                carts,
                checkouts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the cart session registry.
    #[must_use]
    pub fn carts(&self) -> &CartSessions {
        &self.inner.carts
    }

    /// Get a reference to the live checkout registry.
    #[must_use]
    pub fn checkouts(&self) -> &CheckoutSessions {
        &self.inner.checkouts
    }
}
