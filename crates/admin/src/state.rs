//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::gateway::{AdminGateway, AdminGatewayError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    gateway: AdminGateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, AdminGatewayError> {
        let gateway = AdminGateway::new(&config)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, gateway }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the relay client.
    #[must_use]
    pub fn gateway(&self) -> &AdminGateway {
        &self.inner.gateway
    }
}
