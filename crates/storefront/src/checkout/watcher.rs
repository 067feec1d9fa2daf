//! Fixed-interval payment-status polling.
//!
//! One watcher exists per awaiting-payment order. It queries the gateway
//! immediately, then every [`POLL_INTERVAL`], until the status turns
//! `SUCCESS` or the watcher is cancelled. Poll failures are logged and
//! ignored on the fixed schedule — no backoff, no retry budget. The task
//! is held as an abortable handle, never a bare interval buried in a
//! closure: a stray timer firing against a torn-down checkout is a defect.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::checkout::{CheckoutPhase, PaymentGateway};
use crate::gateway::GatewayError;

/// Fixed polling cadence while a QR is on screen.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Handle to the polling task for one order.
pub struct PaymentWatcher {
    shared: Arc<WatcherShared>,
    phase_rx: watch::Receiver<CheckoutPhase>,
}

struct WatcherShared {
    gateway: Arc<dyn PaymentGateway>,
    // The submitting request's credential, kept only for this order's
    // polling lifetime.
    token: String,
    order_id: String,
    phase_tx: watch::Sender<CheckoutPhase>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WatcherShared {
    fn is_paid(&self) -> bool {
        *self.phase_tx.borrow() == CheckoutPhase::Paid
    }

    /// Idempotent transition to `PAID`: the first observation wins, every
    /// later one (scheduled poll or manual check racing it) is a no-op.
    /// Returns whether this call performed the transition.
    fn mark_paid(&self) -> bool {
        let mut transitioned = false;
        self.phase_tx.send_if_modified(|phase| {
            if *phase == CheckoutPhase::Paid {
                return false;
            }
            *phase = CheckoutPhase::Paid;
            transitioned = true;
            true
        });
        if transitioned {
            self.stop();
        }
        transitioned
    }

    fn stop(&self) {
        if let Ok(mut guard) = self.handle.lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
    }
}

impl PaymentWatcher {
    /// Start polling for an order. The first query fires immediately.
    #[must_use]
    pub fn spawn(gateway: Arc<dyn PaymentGateway>, token: &str, order_id: &str) -> Self {
        let (phase_tx, phase_rx) = watch::channel(CheckoutPhase::AwaitingPayment);
        let shared = Arc::new(WatcherShared {
            gateway,
            token: token.to_string(),
            order_id: order_id.to_string(),
            phase_tx,
            handle: Mutex::new(None),
        });

        let task = tokio::spawn(poll_loop(Arc::clone(&shared)));
        if let Ok(mut guard) = shared.handle.lock() {
            *guard = Some(task);
        }

        Self { shared, phase_rx }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        *self.phase_rx.borrow()
    }

    /// Subscribe to phase changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase_rx.clone()
    }

    /// One out-of-band status query ("check now"), reusing the same
    /// transition rule as the scheduled polls. Safe to race with them.
    ///
    /// # Errors
    ///
    /// Unlike scheduled polls, a manual check is a user action and its
    /// failure is surfaced to the caller.
    pub async fn check_now(&self) -> Result<CheckoutPhase, GatewayError> {
        if self.shared.is_paid() {
            return Ok(CheckoutPhase::Paid);
        }

        let status = self
            .shared
            .gateway
            .payment_status(&self.shared.token, &self.shared.order_id)
            .await?;

        if status.is_success() {
            self.shared.mark_paid();
        }
        Ok(self.phase())
    }

    /// Stop polling. Idempotent; callable after the `PAID` transition
    /// without error.
    pub fn cancel(&self) {
        self.shared.stop();
    }
}

impl Drop for PaymentWatcher {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

async fn poll_loop(shared: Arc<WatcherShared>) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        if shared.is_paid() {
            break;
        }
        match shared
            .gateway
            .payment_status(&shared.token, &shared.order_id)
            .await
        {
            Ok(status) if status.is_success() => {
                shared.mark_paid();
                break;
            }
            Ok(_) => {}
            // Swallowed by design: transient noise during a multi-minute
            // wait is logged, never surfaced per tick.
            Err(e) => warn!(order_id = %shared.order_id, "payment status poll failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lotus_core::PaymentStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::checkout::ShippingDetails;
    use crate::gateway::types::{OrderCreated, QrCode};

    struct StatusScript {
        responses: Mutex<VecDeque<Result<PaymentStatus, String>>>,
        polls: AtomicUsize,
    }

    impl StatusScript {
        fn new(responses: Vec<Result<PaymentStatus, String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                polls: AtomicUsize::new(0),
            })
        }

        fn poll_count(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for StatusScript {
        async fn create_order(
            &self,
            _token: &str,
            _shipping: &ShippingDetails,
        ) -> Result<OrderCreated, GatewayError> {
            panic!("not used by watcher tests")
        }

        async fn request_payment_qr(
            &self,
            _token: &str,
            _order_id: &str,
        ) -> Result<QrCode, GatewayError> {
            panic!("not used by watcher tests")
        }

        async fn payment_status(
            &self,
            _token: &str,
            _order_id: &str,
        ) -> Result<PaymentStatus, GatewayError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .expect("lock")
                .pop_front()
                // Past the script the order stays pending.
                .unwrap_or(Ok(PaymentStatus::Pending));
            next.map_err(|message| GatewayError::Api {
                status: 500,
                message,
            })
        }
    }

    async fn wait_for_paid(watcher: &PaymentWatcher) {
        let mut rx = watcher.subscribe();
        while *rx.borrow() != CheckoutPhase::Paid {
            rx.changed().await.expect("watcher sender alive");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_three_times_then_success_transitions_once() {
        let script = StatusScript::new(vec![
            Ok(PaymentStatus::Pending),
            Ok(PaymentStatus::Pending),
            Ok(PaymentStatus::Pending),
            Ok(PaymentStatus::Success),
        ]);
        let watcher = PaymentWatcher::spawn(script.clone(), "tok", "o1");

        wait_for_paid(&watcher).await;
        assert_eq!(watcher.phase(), CheckoutPhase::Paid);
        assert_eq!(script.poll_count(), 4);

        // No further polls after the terminal transition.
        tokio::time::sleep(POLL_INTERVAL * 5).await;
        assert_eq!(script.poll_count(), 4);

        // Cleanup stays callable without error post-transition.
        watcher.cancel();
        watcher.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_errors_are_swallowed_and_polling_continues() {
        let script = StatusScript::new(vec![
            Err("boom".to_string()),
            Err("boom again".to_string()),
            Ok(PaymentStatus::Success),
        ]);
        let watcher = PaymentWatcher::spawn(script.clone(), "tok", "o1");

        wait_for_paid(&watcher).await;
        assert_eq!(script.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_check_races_safely_with_scheduled_polls() {
        let script = StatusScript::new(vec![
            Ok(PaymentStatus::Pending),
            Ok(PaymentStatus::Success),
        ]);
        let watcher = PaymentWatcher::spawn(script.clone(), "tok", "o1");

        // First scheduled poll sees PENDING.
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Manual check consumes the SUCCESS response.
        let phase = watcher.check_now().await.expect("manual check");
        assert_eq!(phase, CheckoutPhase::Paid);

        // Once paid, further manual checks answer without querying.
        let before = script.poll_count();
        let phase = watcher.check_now().await.expect("manual check");
        assert_eq!(phase, CheckoutPhase::Paid);
        assert_eq!(script.poll_count(), before);

        // And the scheduled loop stops polling too.
        tokio::time::sleep(POLL_INTERVAL * 5).await;
        assert_eq!(script.poll_count(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling_before_success() {
        let script = StatusScript::new(vec![]);
        let watcher = PaymentWatcher::spawn(script.clone(), "tok", "o1");

        // Let a couple of polls happen, then tear down.
        tokio::time::sleep(POLL_INTERVAL * 2).await;
        watcher.cancel();
        let stopped_at = script.poll_count();

        tokio::time::sleep(POLL_INTERVAL * 5).await;
        assert_eq!(script.poll_count(), stopped_at);
        assert_eq!(watcher.phase(), CheckoutPhase::AwaitingPayment);
    }
}
