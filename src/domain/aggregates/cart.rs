//! Cart Aggregate

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::product::ProductSnapshot;
use crate::domain::value_objects::{ProductId, Quantity};

/// In-memory shopping cart keyed by product id.
///
/// Entries keep insertion order for display. Every entry has a quantity of
/// at least one; operations that would drop it lower delete the entry.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    pub product: ProductSnapshot,
    pub quantity: Quantity,
}

impl CartEntry {
    pub fn line_total(&self) -> Decimal { self.product.price().multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn entries(&self) -> &[CartEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn get(&self, product_id: &ProductId) -> Option<&CartEntry> { self.entries.iter().find(|e| e.product.id() == product_id) }
    pub fn contains(&self, product_id: &ProductId) -> bool { self.get(product_id).is_some() }

    /// Adds one unit. An existing entry keeps the snapshot it was created with.
    pub fn add(&mut self, product: ProductSnapshot) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.product.id() == product.id()) {
            existing.quantity = existing.quantity.increment();
            tracing::debug!(product_id = %product.id(), quantity = %existing.quantity, "cart quantity incremented");
        } else {
            tracing::debug!(product_id = %product.id(), "cart entry added");
            self.entries.push(CartEntry { product, quantity: Quantity::ONE });
        }
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        let before = self.entries.len();
        self.entries.retain(|e| e.product.id() != product_id);
        if self.entries.len() != before { tracing::debug!(%product_id, "cart entry removed"); }
    }

    /// Replaces the quantity of an existing entry. Values below one remove it;
    /// unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        let Some(quantity) = Quantity::from_signed(quantity) else {
            self.remove(product_id);
            return;
        };
        if let Some(entry) = self.entries.iter_mut().find(|e| e.product.id() == product_id) {
            entry.quantity = quantity;
        }
    }

    pub fn clear(&mut self) { self.entries.clear(); }

    pub fn total_items(&self) -> u64 { self.entries.iter().map(|e| u64::from(e.quantity.value())).sum() }

    /// Sum of line totals at full precision.
    pub fn total_price(&self) -> Decimal { self.entries.iter().map(CartEntry::line_total).sum() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Product;
    use proptest::prelude::*;

    fn snap(id: &str, name: &str, cents: i64) -> ProductSnapshot {
        Product::new(id, name, Decimal::new(cents, 2)).snapshot().unwrap()
    }

    fn pid(id: &str) -> ProductId { ProductId::new(id).unwrap() }

    #[test]
    fn test_add_twice_merges() {
        let mut cart = Cart::new();
        cart.add(snap("1", "Produto 1", 1099));
        cart.add(snap("1", "Produto 1", 1099));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Decimal::new(2198, 2));

        cart.update_quantity(&pid("1"), 0);
        assert_eq!(cart.total_items(), 0);
        assert!(!cart.contains(&pid("1")));
    }

    #[test]
    fn test_add_keeps_original_snapshot() {
        let mut cart = Cart::new();
        cart.add(snap("1", "Old name", 1000));
        cart.add(snap("1", "New name", 9999));
        let entry = cart.get(&pid("1")).unwrap();
        assert_eq!(entry.product.name(), "Old name");
        assert_eq!(cart.total_price(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_accumulates_without_rounding() {
        let mut cart = Cart::new();
        for _ in 0..3 { cart.add(snap("1", "Produto 1", 1099)); }
        assert_eq!(cart.total_price(), Decimal::new(3297, 2));

        let mut cart = Cart::new();
        cart.add(Product::new("x", "Bulk", Decimal::new(3333, 3)).snapshot().unwrap());
        cart.update_quantity(&pid("x"), 3);
        assert_eq!(cart.total_price(), Decimal::new(9999, 3));
    }

    #[test]
    fn test_negative_quantity_removes() {
        let mut cart = Cart::new();
        cart.add(snap("1", "A", 100));
        cart.add(snap("2", "B", 200));
        cart.update_quantity(&pid("1"), -1);
        assert!(!cart.contains(&pid("1")));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_huge_quantity_saturates() {
        let mut cart = Cart::new();
        cart.add(snap("1", "A", 100));
        cart.update_quantity(&pid("1"), 5_000_000_000);
        assert!(cart.contains(&pid("1")));
        assert_eq!(cart.total_items(), u64::from(u32::MAX));
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let mut cart = Cart::new();
        cart.add(snap("1", "A", 100));
        cart.remove(&pid("nope"));
        cart.update_quantity(&pid("nope"), 5);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(snap("1", "A", 1099));
        cart.add(snap("2", "B", 2550));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add(snap("b", "B", 100));
        cart.add(snap("a", "A", 100));
        cart.add(snap("b", "B", 100));
        let ids: Vec<_> = cart.entries().iter().map(|e| e.product.id().as_str().to_owned()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[derive(Debug, Clone)]
    enum Op { Add(u8), Remove(u8), Update(u8, i64) }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5).prop_map(Op::Add),
            (0u8..5).prop_map(Op::Remove),
            ((0u8..5), -3i64..6).prop_map(|(id, q)| Op::Update(id, q)),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_match_entries(ops in prop::collection::vec(op(), 0..60)) {
            let mut cart = Cart::new();
            for op in ops {
                match op {
                    Op::Add(id) => cart.add(snap(&id.to_string(), "P", 1099 + i64::from(id) * 250)),
                    Op::Remove(id) => cart.remove(&pid(&id.to_string())),
                    Op::Update(id, q) => cart.update_quantity(&pid(&id.to_string()), q),
                }
            }
            let items: u64 = cart.entries().iter().map(|e| u64::from(e.quantity.value())).sum();
            let price: Decimal = cart.entries().iter()
                .map(|e| e.product.price().amount() * Decimal::from(e.quantity.value()))
                .sum();
            prop_assert_eq!(cart.total_items(), items);
            prop_assert_eq!(cart.total_price(), price);
            prop_assert!(cart.entries().iter().all(|e| e.quantity.value() >= 1));
            let mut ids: Vec<_> = cart.entries().iter().map(|e| e.product.id().clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), cart.len());
        }
    }
}
