//! In-memory cart state.
//!
//! The store is the sole owner of the current line list. It never talks to
//! the network: callers mutate the gateway first and reconcile here, which
//! keeps every operation a synchronously-testable reducer.

use lotus_core::Vnd;
use serde::Serialize;

/// One row in the cart: a quantity of a specific product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Opaque server-assigned line id; never fabricated client-side.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price in whole VND.
    pub unit_price: Vnd,
    /// Resolved display image, if any; `None` renders a placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Always at least 1.
    pub quantity: u32,
}

/// The cart contents for one session.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    items: Vec<CartLineItem>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Unconditionally replace the whole cart. Used after a full refresh.
    pub fn replace_all(&mut self, items: Vec<CartLineItem>) {
        self.items = items;
    }

    /// Merge a line into the cart: an existing line with the same id has
    /// its quantity incremented, otherwise the line is appended.
    pub fn add_or_merge(&mut self, item: CartLineItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Replace the quantity of the matching line.
    ///
    /// Quantities below 1 are rejected silently: deletion semantics belong
    /// to the remote gateway, so a zero or negative change is a guard-rail
    /// no-op rather than an implicit remove.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    /// Remove the matching line, if present.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total quantity across all lines. Recomputed on every read.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of quantity × unit price across all lines. Recomputed on every
    /// read.
    #[must_use]
    pub fn subtotal(&self) -> Vnd {
        self.items
            .iter()
            .fold(Vnd::ZERO, |acc, i| acc.plus(i.unit_price.times(i.quantity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32, unit_price: i64) -> CartLineItem {
        CartLineItem {
            id: id.to_string(),
            name: format!("product {id}"),
            unit_price: Vnd(unit_price),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_add_or_merge_merges_same_id() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 2, 1000));
        store.add_or_merge(line("a", 3, 1000));

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.item_count(), 5);
        assert_eq!(store.subtotal(), Vnd(5000));
    }

    #[test]
    fn test_add_or_merge_appends_new_id() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 1, 1000));
        store.add_or_merge(line("b", 2, 500));

        assert_eq!(store.items().len(), 2);
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.subtotal(), Vnd(2000));
    }

    #[test]
    fn test_set_quantity_below_one_is_a_no_op() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 2, 1000));
        let before = store.items().to_vec();

        store.set_quantity("a", 0);
        assert_eq!(store.items(), before.as_slice());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 2, 1000));
        store.set_quantity("a", 7);

        assert_eq!(store.item_count(), 7);
        assert_eq!(store.subtotal(), Vnd(7000));
    }

    #[test]
    fn test_set_quantity_unknown_id_is_a_no_op() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 2, 1000));
        store.set_quantity("missing", 5);

        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_remove_filters_line_out() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 1, 1000));
        store.add_or_merge(line("b", 1, 2000));
        store.remove("a");

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.subtotal(), Vnd(2000));
    }

    #[test]
    fn test_replace_all_leaves_no_leftovers() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 1, 1000));
        store.add_or_merge(line("b", 1, 1000));

        store.replace_all(vec![line("c", 4, 250)]);

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, "c");
        assert_eq!(store.item_count(), 4);
        assert_eq!(store.subtotal(), Vnd(1000));
    }

    #[test]
    fn test_clear_empties() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 3, 1000));
        store.clear();

        assert!(store.items().is_empty());
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.subtotal(), Vnd::ZERO);
    }

    #[test]
    fn test_counts_never_negative_across_sequences() {
        let mut store = CartStore::new();
        store.add_or_merge(line("a", 2, 100));
        store.set_quantity("a", 0);
        store.remove("b");
        store.add_or_merge(line("b", 1, 50));
        store.set_quantity("b", 3);
        store.remove("a");

        assert_eq!(store.item_count(), 3);
        assert_eq!(
            store.item_count(),
            store.items().iter().map(|i| i.quantity).sum::<u32>()
        );
    }
}
