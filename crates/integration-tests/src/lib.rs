//! Shared test helpers: a scripted in-memory gateway.
//!
//! `MockGateway` implements both seam traits (`CartGateway`,
//! `PaymentGateway`) with per-operation response queues and invocation
//! counters. An exhausted queue falls back to a benign default (empty
//! cart, empty catalog, successful mutation, `PENDING` status), so tests
//! only script the interesting part.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_errors_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lotus_core::{PaymentStatus, Vnd};
use lotus_storefront::cart::CartGateway;
use lotus_storefront::checkout::{PaymentGateway, ShippingDetails};
use lotus_storefront::gateway::GatewayError;
use lotus_storefront::gateway::types::{
    AddCartItemRequest, CartLineWire, CatalogProduct, CatalogVariant, OrderCreated, QrCode,
};

/// Scripted response queue for one operation.
type Script<T> = Mutex<VecDeque<Result<T, GatewayError>>>;

fn pop<T>(script: &Script<T>, default: impl FnOnce() -> Result<T, GatewayError>) -> Result<T, GatewayError> {
    script
        .lock()
        .expect("script lock")
        .pop_front()
        .unwrap_or_else(|| default())
}

/// A gateway failure with a message, the common scripted error.
#[must_use]
pub fn api_error(status: u16, message: &str) -> GatewayError {
    GatewayError::Api {
        status,
        message: message.to_string(),
    }
}

/// Build a wire cart line.
#[must_use]
pub fn wire_line(
    id: &str,
    name: &str,
    unit_price: i64,
    quantity: u32,
    variant: Option<&str>,
    image: Option<&str>,
) -> CartLineWire {
    CartLineWire {
        id: id.to_string(),
        product_name: name.to_string(),
        unit_price: Vnd(unit_price),
        quantity,
        product_variant_id: variant.map(ToString::to_string),
        image_url: image.map(ToString::to_string),
    }
}

/// Build a catalog product with variants sharing one image list.
#[must_use]
pub fn catalog_product(id: &str, images: &[&str], variant_ids: &[&str]) -> CatalogProduct {
    CatalogProduct {
        id: id.to_string(),
        images: images.iter().map(ToString::to_string).collect(),
        variants: variant_ids
            .iter()
            .map(|v| CatalogVariant { id: (*v).to_string() })
            .collect(),
    }
}

/// A complete set of shipping details for the happy-path scenarios.
#[must_use]
pub fn shipping_details() -> ShippingDetails {
    ShippingDetails {
        full_name: "Nguyen Van A".to_string(),
        phone_number: "0900000000".to_string(),
        city: "Hà Nội".to_string(),
        ward: "Phường X".to_string(),
        street: "123 Lê Lợi".to_string(),
        note: None,
    }
}

/// Invocation counters, one per gateway operation.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub fetch_cart: AtomicUsize,
    pub active_catalog: AtomicUsize,
    pub add_item: AtomicUsize,
    pub update_item: AtomicUsize,
    pub remove_item: AtomicUsize,
    pub create_order: AtomicUsize,
    pub request_qr: AtomicUsize,
    pub payment_status: AtomicUsize,
}

impl CallCounts {
    /// Total calls across every operation.
    pub fn total(&self) -> usize {
        [
            &self.fetch_cart,
            &self.active_catalog,
            &self.add_item,
            &self.update_item,
            &self.remove_item,
            &self.create_order,
            &self.request_qr,
            &self.payment_status,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// Scripted in-memory gateway.
#[derive(Default)]
pub struct MockGateway {
    pub calls: CallCounts,
    cart: Script<Vec<CartLineWire>>,
    catalog: Script<Arc<Vec<CatalogProduct>>>,
    add: Script<()>,
    update: Script<()>,
    remove: Script<()>,
    orders: Script<OrderCreated>,
    qrs: Script<QrCode>,
    statuses: Script<PaymentStatus>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_cart(&self, response: Result<Vec<CartLineWire>, GatewayError>) {
        self.cart.lock().expect("script lock").push_back(response);
    }

    pub fn queue_catalog(&self, response: Result<Vec<CatalogProduct>, GatewayError>) {
        self.catalog
            .lock()
            .expect("script lock")
            .push_back(response.map(Arc::new));
    }

    pub fn queue_add(&self, response: Result<(), GatewayError>) {
        self.add.lock().expect("script lock").push_back(response);
    }

    pub fn queue_update(&self, response: Result<(), GatewayError>) {
        self.update.lock().expect("script lock").push_back(response);
    }

    pub fn queue_remove(&self, response: Result<(), GatewayError>) {
        self.remove.lock().expect("script lock").push_back(response);
    }

    pub fn queue_order(&self, response: Result<OrderCreated, GatewayError>) {
        self.orders.lock().expect("script lock").push_back(response);
    }

    pub fn queue_qr(&self, response: Result<QrCode, GatewayError>) {
        self.qrs.lock().expect("script lock").push_back(response);
    }

    pub fn queue_status(&self, response: Result<PaymentStatus, GatewayError>) {
        self.statuses.lock().expect("script lock").push_back(response);
    }
}

#[async_trait]
impl CartGateway for MockGateway {
    async fn fetch_cart(&self, _token: &str) -> Result<Vec<CartLineWire>, GatewayError> {
        self.calls.fetch_cart.fetch_add(1, Ordering::SeqCst);
        pop(&self.cart, || Ok(Vec::new()))
    }

    async fn active_catalog(&self) -> Result<Arc<Vec<CatalogProduct>>, GatewayError> {
        self.calls.active_catalog.fetch_add(1, Ordering::SeqCst);
        pop(&self.catalog, || Ok(Arc::new(Vec::new())))
    }

    async fn add_cart_item(
        &self,
        _token: &str,
        _request: &AddCartItemRequest,
    ) -> Result<(), GatewayError> {
        self.calls.add_item.fetch_add(1, Ordering::SeqCst);
        pop(&self.add, || Ok(()))
    }

    async fn update_cart_item(
        &self,
        _token: &str,
        _line_id: &str,
        _quantity: u32,
    ) -> Result<(), GatewayError> {
        self.calls.update_item.fetch_add(1, Ordering::SeqCst);
        pop(&self.update, || Ok(()))
    }

    async fn remove_cart_item(&self, _token: &str, _line_id: &str) -> Result<(), GatewayError> {
        self.calls.remove_item.fetch_add(1, Ordering::SeqCst);
        pop(&self.remove, || Ok(()))
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        _token: &str,
        _shipping: &ShippingDetails,
    ) -> Result<OrderCreated, GatewayError> {
        self.calls.create_order.fetch_add(1, Ordering::SeqCst);
        pop(&self.orders, || {
            Ok(OrderCreated {
                id: "order-default".to_string(),
                order_number: None,
            })
        })
    }

    async fn request_payment_qr(
        &self,
        _token: &str,
        _order_id: &str,
    ) -> Result<QrCode, GatewayError> {
        self.calls.request_qr.fetch_add(1, Ordering::SeqCst);
        pop(&self.qrs, || {
            Ok(QrCode {
                qr_url: "https://pay.example/qr-default.png".to_string(),
            })
        })
    }

    async fn payment_status(
        &self,
        _token: &str,
        _order_id: &str,
    ) -> Result<PaymentStatus, GatewayError> {
        self.calls.payment_status.fetch_add(1, Ordering::SeqCst);
        pop(&self.statuses, || Ok(PaymentStatus::Pending))
    }
}
