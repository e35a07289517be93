//! Favorites Aggregate

use serde::Serialize;
use crate::domain::aggregates::product::ProductSnapshot;
use crate::domain::value_objects::ProductId;

/// Products saved for later, independent of the cart.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Favorites {
    items: Vec<ProductSnapshot>,
}

impl Favorites {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[ProductSnapshot] { &self.items }
    pub fn total_items(&self) -> usize { self.items.len() }
    pub fn contains(&self, product_id: &ProductId) -> bool { self.items.iter().any(|p| p.id() == product_id) }

    /// Returns `false` when the product was already saved.
    pub fn add(&mut self, product: ProductSnapshot) -> bool {
        if self.contains(product.id()) { return false; }
        self.items.push(product);
        true
    }

    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) { self.items.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Product;
    use rust_decimal::Decimal;

    #[test]
    fn test_add_is_idempotent() {
        let p = Product::new("1", "Produto 1", Decimal::new(1099, 2)).snapshot().unwrap();
        let mut favs = Favorites::new();
        assert!(favs.add(p.clone()));
        assert!(!favs.add(p.clone()));
        assert_eq!(favs.total_items(), 1);
        assert!(favs.contains(p.id()));

        assert!(favs.remove(p.id()));
        assert!(!favs.remove(p.id()));
        assert_eq!(favs.total_items(), 0);
    }

    #[test]
    fn test_clear() {
        let mut favs = Favorites::new();
        favs.add(Product::new("1", "A", Decimal::ONE).snapshot().unwrap());
        favs.add(Product::new("2", "B", Decimal::ONE).snapshot().unwrap());
        favs.clear();
        assert_eq!(favs.total_items(), 0);
        assert!(favs.items().is_empty());
    }
}
