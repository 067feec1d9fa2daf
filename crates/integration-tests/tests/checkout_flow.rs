//! Checkout submission and payment-polling scenarios against the mock
//! gateway. Timer-driven tests run with paused time, so the 3-second
//! polling cadence is deterministic.

use std::sync::atomic::Ordering;
use std::time::Duration;

use lotus_core::PaymentStatus;
use lotus_integration_tests::{MockGateway, api_error, shipping_details};
use lotus_storefront::checkout::{
    CheckoutError, CheckoutPhase, CheckoutSessions, POLL_INTERVAL,
};
use lotus_storefront::gateway::types::{OrderCreated, QrCode};

const TOKEN: &str = "test-token";

fn order_ok() -> OrderCreated {
    OrderCreated {
        id: "o1".to_string(),
        order_number: Some("ORD001".to_string()),
    }
}

fn qr_ok() -> QrCode {
    QrCode {
        qr_url: "https://pay.example/qr.png".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_happy_path_reaches_paid_with_redirect_pending() {
    let gateway = MockGateway::new();
    gateway.queue_order(Ok(order_ok()));
    gateway.queue_qr(Ok(qr_ok()));
    gateway.queue_status(Ok(PaymentStatus::Success));

    let checkouts = CheckoutSessions::new(gateway.clone());
    let session = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect("submission succeeds");

    assert_eq!(session.order_id, "o1");
    assert_eq!(session.order_number.as_deref(), Some("ORD001"));
    assert_eq!(session.qr_url, "https://pay.example/qr.png");

    // First poll fires immediately and sees SUCCESS.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.phase(), CheckoutPhase::Paid);

    // Polling stopped for good.
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(gateway.calls.payment_status.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_required_field_issues_no_network_call() {
    let gateway = MockGateway::new();
    let checkouts = CheckoutSessions::new(gateway.clone());

    let mut shipping = shipping_details();
    shipping.city = "   ".to_string();

    let err = checkouts
        .begin(TOKEN, &shipping)
        .await
        .expect_err("validation fails");
    assert!(matches!(err, CheckoutError::MissingField { field: "city" }));
    assert_eq!(gateway.calls.total(), 0);
}

#[tokio::test]
async fn test_qr_failure_returns_to_form_and_registers_nothing() {
    let gateway = MockGateway::new();
    gateway.queue_order(Ok(order_ok()));
    gateway.queue_qr(Err(api_error(502, "Ví điện tử không phản hồi")));

    let checkouts = CheckoutSessions::new(gateway.clone());
    let err = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect_err("qr failure fails the submission");

    match err {
        CheckoutError::QrRequest { message } => {
            assert_eq!(message, "Ví điện tử không phản hồi");
        }
        other => panic!("expected QrRequest, got {other:?}"),
    }

    // The created order's id is discarded: nothing registered, no QR
    // retry, no polling ever started.
    assert!(checkouts.get("o1").is_none());
    assert_eq!(gateway.calls.request_qr.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.calls.payment_status.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_polling_pending_three_times_then_success() {
    let gateway = MockGateway::new();
    gateway.queue_order(Ok(order_ok()));
    gateway.queue_qr(Ok(qr_ok()));
    gateway.queue_status(Ok(PaymentStatus::Pending));
    gateway.queue_status(Ok(PaymentStatus::Pending));
    gateway.queue_status(Ok(PaymentStatus::Pending));
    gateway.queue_status(Ok(PaymentStatus::Success));

    let checkouts = CheckoutSessions::new(gateway.clone());
    let session = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect("submission succeeds");

    // Polls at 0s, 3s, 6s, 9s; the fourth answers SUCCESS.
    tokio::time::sleep(POLL_INTERVAL * 3 + Duration::from_millis(100)).await;
    assert_eq!(session.phase(), CheckoutPhase::Paid);
    assert_eq!(gateway.calls.payment_status.load(Ordering::SeqCst), 4);

    // No further polls afterwards, and teardown stays callable.
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(gateway.calls.payment_status.load(Ordering::SeqCst), 4);
    assert!(checkouts.teardown("o1"));
}

#[tokio::test(start_paused = true)]
async fn test_manual_check_shares_the_transition_rule() {
    let gateway = MockGateway::new();
    gateway.queue_order(Ok(order_ok()));
    gateway.queue_qr(Ok(qr_ok()));
    gateway.queue_status(Ok(PaymentStatus::Pending));
    gateway.queue_status(Ok(PaymentStatus::Success));

    let checkouts = CheckoutSessions::new(gateway.clone());
    let session = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect("submission succeeds");

    // Scheduled poll sees PENDING; the user's manual check lands the
    // SUCCESS and performs the (idempotent) transition.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let phase = session.check_now().await.expect("manual check");
    assert_eq!(phase, CheckoutPhase::Paid);

    let polls = gateway.calls.payment_status.load(Ordering::SeqCst);
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(gateway.calls.payment_status.load(Ordering::SeqCst), polls);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_polling_while_pending() {
    let gateway = MockGateway::new();
    gateway.queue_order(Ok(order_ok()));
    gateway.queue_qr(Ok(qr_ok()));
    // No SUCCESS scripted: the order stays pending forever.

    let checkouts = CheckoutSessions::new(gateway.clone());
    let session = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect("submission succeeds");

    tokio::time::sleep(POLL_INTERVAL * 2 + Duration::from_millis(50)).await;
    assert!(checkouts.teardown("o1"));
    let polls_at_teardown = gateway.calls.payment_status.load(Ordering::SeqCst);
    assert!(polls_at_teardown >= 1);

    // A torn-down attempt is forgotten and its poller is dead.
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(
        gateway.calls.payment_status.load(Ordering::SeqCst),
        polls_at_teardown
    );
    assert!(checkouts.get("o1").is_none());
    assert!(!checkouts.teardown("o1"));
    assert_eq!(session.phase(), CheckoutPhase::AwaitingPayment);
}

#[tokio::test]
async fn test_order_failure_surfaces_server_message() {
    let gateway = MockGateway::new();
    gateway.queue_order(Err(api_error(400, "Giỏ hàng trống")));

    let checkouts = CheckoutSessions::new(gateway.clone());
    let err = checkouts
        .begin(TOKEN, &shipping_details())
        .await
        .expect_err("order failure fails the submission");

    match err {
        CheckoutError::OrderCreate { message } => assert_eq!(message, "Giỏ hàng trống"),
        other => panic!("expected OrderCreate, got {other:?}"),
    }
    assert_eq!(gateway.calls.request_qr.load(Ordering::SeqCst), 0);
}
