//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::{Price, ProductId, Quantity};

const ORDER_ID_PREFIX: &str = "ORD-";

/// Time-ordered order identifier, rendered as `ORD-<uuid>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    // Only `OrderHistory::add` mints ids.
    fn mint() -> Self { Self(Uuid::now_v7()) }
    pub fn as_uuid(&self) -> &Uuid { &self.0 }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{ORDER_ID_PREFIX}{}", self.0.hyphenated()) }
}

impl FromStr for OrderId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.strip_prefix(ORDER_ID_PREFIX).unwrap_or(s)).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Price,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal { self.unit_price.multiply(self.quantity) }
}

/// Pending order captured from the cart at finalize time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub customer_name: String,
    pub customer_email: String,
}

impl OrderDraft {
    /// Snapshots the cart in iteration order. Returns `None` for an empty cart.
    pub fn from_cart(cart: &Cart, customer_name: impl Into<String>, customer_email: impl Into<String>) -> Option<Self> {
        if cart.is_empty() { return None; }
        let items = cart.entries().iter().map(|e| OrderLine {
            product_id: e.product.id().clone(),
            name: e.product.name().to_owned(),
            quantity: e.quantity,
            unit_price: e.product.price(),
        }).collect();
        Some(Self { items, total: cart.total_price(), customer_name: customer_name.into(), customer_email: customer_email.into() })
    }

    pub fn total_items(&self) -> u64 { self.items.iter().map(|l| u64::from(l.quantity.value())).sum() }
}

/// Committed purchase. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    number: u64,
    created_at: DateTime<Utc>,
    items: Vec<OrderLine>,
    total: Decimal,
    customer_name: String,
    customer_email: String,
}

impl Order {
    pub fn id(&self) -> OrderId { self.id }
    pub fn number(&self) -> u64 { self.number }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn items(&self) -> &[OrderLine] { &self.items }
    pub fn total(&self) -> Decimal { self.total }
    pub fn customer_name(&self) -> &str { &self.customer_name }
    pub fn customer_email(&self) -> &str { &self.customer_email }
    pub fn total_items(&self) -> u64 { self.items.iter().map(|l| u64::from(l.quantity.value())).sum() }
}

/// Session order history, most recent first.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OrderHistory {
    orders: Vec<Order>,
    last_number: u64,
}

impl OrderHistory {
    pub fn new() -> Self { Self::default() }

    /// Commits a draft. This is the only place order ids are minted.
    pub fn add(&mut self, draft: OrderDraft, created_at: DateTime<Utc>) -> Order {
        self.last_number += 1;
        let order = Order {
            id: OrderId::mint(), number: self.last_number, created_at,
            items: draft.items, total: draft.total,
            customer_name: draft.customer_name, customer_email: draft.customer_email,
        };
        tracing::info!(order_id = %order.id, number = order.number, total = %order.total, "order recorded");
        self.orders.insert(0, order.clone());
        order
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> { self.orders.iter().find(|o| &o.id == id) }

    /// Looks up an order by its rendered id; malformed ids are simply not found.
    pub fn get_str(&self, id: &str) -> Option<&Order> { id.parse().ok().and_then(|id| self.get(&id)) }

    pub fn orders(&self) -> &[Order] { &self.orders }
    pub fn total_orders(&self) -> usize { self.orders.len() }
}
