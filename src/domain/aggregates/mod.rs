//! Aggregates module
pub mod product;
pub mod cart;
pub mod favorites;
pub mod order;

pub use product::{Product, ProductSnapshot};
pub use cart::{Cart, CartEntry};
pub use favorites::Favorites;
pub use order::{Order, OrderDraft, OrderHistory, OrderId, OrderLine};
