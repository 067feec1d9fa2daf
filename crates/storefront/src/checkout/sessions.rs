//! Registry of live checkout attempts.
//!
//! Keyed by order id so the browser can query the phase, trigger a manual
//! status check, and tear the attempt down on navigation. Teardown aborts
//! the poller; dropping a session does the same.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::checkout::{
    CheckoutError, CheckoutPhase, PaymentGateway, PaymentWatcher, ShippingDetails, place_order,
};
use crate::gateway::GatewayError;

/// One active checkout attempt: the created order, its QR, and the poller.
pub struct CheckoutSession {
    pub order_id: String,
    pub order_number: Option<String>,
    pub qr_url: String,
    pub created_at: DateTime<Utc>,
    watcher: PaymentWatcher,
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("order_id", &self.order_id)
            .field("order_number", &self.order_number)
            .field("qr_url", &self.qr_url)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl CheckoutSession {
    /// Current phase of this attempt.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.watcher.phase()
    }

    /// One out-of-band status check, same transition rule as the poller.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; manual checks surface failures.
    pub async fn check_now(&self) -> Result<CheckoutPhase, GatewayError> {
        self.watcher.check_now().await
    }

    /// Stop polling for this attempt.
    pub fn cancel(&self) {
        self.watcher.cancel();
    }
}

/// All live checkout attempts for this process.
#[derive(Clone)]
pub struct CheckoutSessions {
    gateway: Arc<dyn PaymentGateway>,
    sessions: Arc<Mutex<HashMap<String, Arc<CheckoutSession>>>>,
}

impl CheckoutSessions {
    /// Create the registry.
    #[must_use]
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submit the shipping form: validate, create the order, request the
    /// QR, and start polling. On success the attempt is registered under
    /// its order id.
    ///
    /// # Errors
    ///
    /// Propagates [`CheckoutError`]; nothing is registered on failure.
    pub async fn begin(
        &self,
        token: &str,
        shipping: &ShippingDetails,
    ) -> Result<Arc<CheckoutSession>, CheckoutError> {
        let placed = place_order(self.gateway.as_ref(), token, shipping).await?;

        let watcher = PaymentWatcher::spawn(Arc::clone(&self.gateway), token, &placed.order.id);
        let session = Arc::new(CheckoutSession {
            order_id: placed.order.id.clone(),
            order_number: placed.order.order_number,
            qr_url: placed.qr_url,
            created_at: Utc::now(),
            watcher,
        });

        if let Ok(mut sessions) = self.sessions.lock() {
            // A re-submission for the same order replaces the old attempt;
            // its poller must not keep firing.
            if let Some(previous) = sessions.insert(placed.order.id, Arc::clone(&session)) {
                previous.cancel();
            }
        }

        Ok(session)
    }

    /// Look up a live attempt.
    #[must_use]
    pub fn get(&self, order_id: &str) -> Option<Arc<CheckoutSession>> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(order_id).cloned())
    }

    /// Tear down an attempt (navigation away). Stops its poller.
    ///
    /// Returns whether an attempt was actually registered.
    pub fn teardown(&self, order_id: &str) -> bool {
        let removed = self
            .sessions
            .lock()
            .ok()
            .and_then(|mut sessions| sessions.remove(order_id));
        match removed {
            Some(session) => {
                session.cancel();
                true
            }
            None => false,
        }
    }
}
