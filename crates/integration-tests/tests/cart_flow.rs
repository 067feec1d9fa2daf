//! Cart synchronization and mutation-flow scenarios against the mock
//! gateway.

use std::sync::atomic::Ordering;

use lotus_core::Vnd;
use lotus_integration_tests::{MockGateway, api_error, catalog_product, wire_line};
use lotus_storefront::cart::CartSession;
use lotus_storefront::gateway::GatewayError;

const TOKEN: &str = "test-token";

#[tokio::test]
async fn test_refresh_reconciles_and_enriches_images() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![
        wire_line("l1", "Áo dài", 250_000, 1, Some("v1"), None),
        wire_line("l2", "Nón lá", 80_000, 2, Some("v2"), None),
    ]));
    gateway.queue_catalog(Ok(vec![
        catalog_product("p1", &["ao-dai.png"], &["v1"]),
        catalog_product("p2", &["non-la.png"], &["v2"]),
    ]));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    let view = session.view().await;
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.item_count, 3);
    assert_eq!(view.subtotal, Vnd(410_000));
    assert_eq!(view.subtotal_display, "410.000 ₫");
    let images: Vec<Option<&str>> = view.items.iter().map(|i| i.image_url.as_deref()).collect();
    assert_eq!(images, vec![Some("ao-dai.png"), Some("non-la.png")]);

    // One batch catalog fetch for the whole refresh, never per line.
    assert_eq!(gateway.calls.active_catalog.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_skips_catalog_when_images_present() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line(
        "l1",
        "Áo dài",
        250_000,
        1,
        Some("v1"),
        Some("already.png"),
    )]));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    assert_eq!(gateway.calls.active_catalog.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_failure_keeps_stale_state() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 250_000, 2, None, None)]));
    gateway.queue_cart(Err(api_error(500, "gateway down")));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("first refresh");
    let before = session.view().await;

    let err = session.refresh(TOKEN).await.expect_err("second refresh fails");
    assert!(matches!(err, GatewayError::Api { status: 500, .. }));

    let after = session.view().await;
    assert_eq!(after.items, before.items);
    assert_eq!(after.item_count, 2);
}

#[tokio::test]
async fn test_catalog_failure_never_aborts_the_refresh() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 250_000, 1, Some("v1"), None)]));
    gateway.queue_catalog(Err(api_error(503, "catalog down")));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh must survive");

    let view = session.view().await;
    assert_eq!(view.items.len(), 1);
    assert!(view.items[0].image_url.is_none());
}

#[tokio::test]
async fn test_update_quantity_applies_locally_only_after_confirmation() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 1000, 2, None, Some("x.png"))]));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    session
        .update_quantity(TOKEN, "l1", 5)
        .await
        .expect("update confirmed");

    let view = session.view().await;
    assert_eq!(view.item_count, 5);
    assert_eq!(view.subtotal, Vnd(5000));
    // Applied locally, not via a refetch.
    assert_eq!(gateway.calls.fetch_cart.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_update_leaves_local_state_unchanged() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 1000, 2, None, Some("x.png"))]));
    gateway.queue_update(Err(api_error(409, "Sản phẩm đã hết hàng")));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    let err = session
        .update_quantity(TOKEN, "l1", 5)
        .await
        .expect_err("server rejected");
    match err {
        GatewayError::Api { message, .. } => assert_eq!(message, "Sản phẩm đã hết hàng"),
        other => panic!("expected Api error, got {other:?}"),
    }

    assert_eq!(session.view().await.item_count, 2);
}

#[tokio::test]
async fn test_update_quantity_below_one_issues_no_network_call() {
    let gateway = MockGateway::new();
    let session = CartSession::new(gateway.clone());

    session
        .update_quantity(TOKEN, "l1", 0)
        .await
        .expect("silent no-op");
    assert_eq!(gateway.calls.update_item.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_optimistic_removal_removes_locally_on_server_failure() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 1000, 1, None, Some("x.png"))]));
    gateway.queue_remove(Err(api_error(500, "boom")));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    session
        .remove_item(TOKEN, "l1")
        .await
        .expect("fallback treats it as removed");
    assert!(session.view().await.items.is_empty());
}

#[tokio::test]
async fn test_disabled_removal_policy_keeps_line_on_failure() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 1000, 1, None, Some("x.png"))]));
    gateway.queue_remove(Err(api_error(500, "boom")));

    let session = CartSession::with_policy(gateway.clone(), false);
    session.refresh(TOKEN).await.expect("refresh");

    session
        .remove_item(TOKEN, "l1")
        .await
        .expect_err("strict policy surfaces the failure");
    assert_eq!(session.view().await.items.len(), 1);
}

#[tokio::test]
async fn test_auth_failure_on_removal_always_surfaces() {
    let gateway = MockGateway::new();
    gateway.queue_cart(Ok(vec![wire_line("l1", "Áo dài", 1000, 1, None, Some("x.png"))]));
    gateway.queue_remove(Err(GatewayError::Unauthorized));

    let session = CartSession::new(gateway.clone());
    session.refresh(TOKEN).await.expect("refresh");

    let err = session
        .remove_item(TOKEN, "l1")
        .await
        .expect_err("auth failure is exempt from the fallback");
    assert!(matches!(err, GatewayError::Unauthorized));
    assert_eq!(session.view().await.items.len(), 1);
}

#[tokio::test]
async fn test_add_item_confirms_then_refetches() {
    let gateway = MockGateway::new();
    // Refresh after the add returns the server-assigned line.
    gateway.queue_cart(Ok(vec![wire_line("srv-1", "Áo dài", 1000, 1, None, Some("x.png"))]));

    let session = CartSession::new(gateway.clone());
    session
        .add_item(TOKEN, "v1".to_string(), 1)
        .await
        .expect("add");

    let view = session.view().await;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, "srv-1");
    assert_eq!(gateway.calls.add_item.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.calls.fetch_cart.load(Ordering::SeqCst), 1);
}
