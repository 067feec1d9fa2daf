//! Cart state, synchronization, and session glue.
//!
//! The store ([`store::CartStore`]) is a pure reducer over the list of
//! lines; [`sync`] reconciles it from the gateway and backfills images from
//! the catalog; [`session::CartSession`] ties both to the gateway mutation
//! contract for one signed-in browser session.

pub mod session;
pub mod store;
pub mod sync;

use std::sync::Arc;

use async_trait::async_trait;

use crate::gateway::GatewayError;
use crate::gateway::types::{AddCartItemRequest, CartLineWire, CatalogProduct};

pub use session::{CartSession, CartSessions};
pub use store::{CartLineItem, CartStore};

/// The gateway surface the cart component depends on.
///
/// A seam trait so the synchronizer and session logic can be exercised
/// against in-memory fakes.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch the authoritative cart lines for the token's user.
    async fn fetch_cart(&self, token: &str) -> Result<Vec<CartLineWire>, GatewayError>;

    /// Fetch the active product catalog (batch; implementations may cache).
    async fn active_catalog(&self) -> Result<Arc<Vec<CatalogProduct>>, GatewayError>;

    /// Add a variant to the cart. The gateway assigns the line id.
    async fn add_cart_item(
        &self,
        token: &str,
        request: &AddCartItemRequest,
    ) -> Result<(), GatewayError>;

    /// Replace a line's quantity.
    async fn update_cart_item(
        &self,
        token: &str,
        line_id: &str,
        quantity: u32,
    ) -> Result<(), GatewayError>;

    /// Delete a line.
    async fn remove_cart_item(&self, token: &str, line_id: &str) -> Result<(), GatewayError>;
}
