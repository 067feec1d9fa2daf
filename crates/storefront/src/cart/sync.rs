//! Cart refresh and image enrichment.
//!
//! The gateway omits images on cart lines; they are recovered by joining
//! the line's variant id against the active catalog. The catalog is fetched
//! once per refresh (a single batch call, never per line), and only when at
//! least one line is actually missing an image.

use std::collections::HashMap;

use tracing::{instrument, warn};

use crate::cart::{CartGateway, CartLineItem, CartStore};
use crate::gateway::GatewayError;
use crate::gateway::types::{CartLineWire, CatalogProduct};

/// Build the `variant id -> first product image` lookup across the catalog.
#[must_use]
pub fn variant_image_index(products: &[CatalogProduct]) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for product in products {
        let Some(first_image) = product.images.first() else {
            continue;
        };
        for variant in &product.variants {
            index
                .entry(variant.id.clone())
                .or_insert_with(|| first_image.clone());
        }
    }
    index
}

/// Convert wire lines to display lines, backfilling missing images from the
/// index. Lines whose variant is not in the index keep `image_url: None`.
///
/// Pure and idempotent: re-running on the same inputs yields the same list.
#[must_use]
pub fn resolve_lines(
    lines: Vec<CartLineWire>,
    index: &HashMap<String, String>,
) -> Vec<CartLineItem> {
    lines
        .into_iter()
        .map(|line| {
            let image_url = line.image_url.or_else(|| {
                line.product_variant_id
                    .as_ref()
                    .and_then(|variant_id| index.get(variant_id).cloned())
            });
            CartLineItem {
                id: line.id,
                name: line.product_name,
                unit_price: line.unit_price,
                image_url,
                quantity: line.quantity,
            }
        })
        .collect()
}

/// Pull authoritative cart state from the gateway and reconcile images.
///
/// The store is replaced wholesale on success and left untouched on any
/// fetch or parse failure, so transient network errors degrade the display
/// instead of blanking it. A catalog-fetch failure is non-fatal: lines
/// simply keep their missing images.
///
/// # Errors
///
/// Returns the cart-fetch error; the caller decides whether to surface it
/// (auth failures) or keep serving the stale view (transport noise).
#[instrument(skip(gateway, token, store))]
pub async fn refresh<G: CartGateway + ?Sized>(
    gateway: &G,
    token: &str,
    store: &mut CartStore,
) -> Result<(), GatewayError> {
    let lines = gateway.fetch_cart(token).await?;

    let index = if lines.iter().any(|line| line.image_url.is_none()) {
        match gateway.active_catalog().await {
            Ok(products) => variant_image_index(&products),
            Err(e) => {
                warn!("catalog fetch for image enrichment failed: {e}");
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    store.replace_all(resolve_lines(lines, &index));
    Ok(())
}
