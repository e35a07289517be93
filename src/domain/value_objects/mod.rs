//! Value Objects for the storefront session

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Externally assigned product identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(ValueError::EmptyProductId); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ProductId {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self { id.0 }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for ProductId {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

/// Non-negative unit price, kept at full precision.
///
/// Rounding to cents only happens in [`Price::display`] and [`format_brl`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, ValueError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(ValueError::NegativePrice(amount)); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn multiply(&self, qty: Quantity) -> Decimal { self.0 * Decimal::from(qty.value()) }
    pub fn display(&self) -> String { format_brl(self.0) }
}

impl TryFrom<Decimal> for Price {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self { price.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.display()) }
}

/// Cart quantity. Zero is not representable: an entry either has a
/// positive quantity or does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Converts a signed UI quantity; anything below one yields `None`,
    /// values past `u32::MAX` saturate.
    pub fn from_signed(value: i64) -> Option<Self> {
        if value < 1 { return None; }
        Self::new(u32::try_from(value).unwrap_or(u32::MAX))
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn increment(&self) -> Self { Self(self.0.saturating_add(1)) }
}

impl TryFrom<u32> for Quantity {
    type Error = ValueError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value).ok_or(ValueError::ZeroQuantity) }
}

impl From<Quantity> for u32 {
    fn from(qty: Quantity) -> Self { qty.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("product id must not be empty")]
    EmptyProductId,
    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),
    #[error("quantity must be at least one")]
    ZeroQuantity,
}

/// Formats an amount the way the storefront shows prices: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 { grouped.push('.'); }
        grouped.push(digit);
    }

    if negative { format!("-R$ {grouped},{cents}") } else { format!("R$ {grouped},{cents}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_trims() {
        let id = ProductId::new("  sku-1 ").unwrap();
        assert_eq!(id.as_str(), "sku-1");
        assert_eq!(ProductId::new("   "), Err(ValueError::EmptyProductId));
    }

    #[test]
    fn test_price_rejects_negative() {
        assert!(Price::new(Decimal::new(-1, 2)).is_err());
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_quantity_from_signed() {
        assert_eq!(Quantity::from_signed(0), None);
        assert_eq!(Quantity::from_signed(-3), None);
        assert_eq!(Quantity::from_signed(4).map(|q| q.value()), Some(4));
        assert_eq!(Quantity::from_signed(5_000_000_000).map(|q| q.value()), Some(u32::MAX));
        assert_eq!(Quantity::from_signed(i64::MIN), None);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Decimal::new(1099, 2)), "R$ 10,99");
        assert_eq!(format_brl(Decimal::new(123456, 2)), "R$ 1.234,56");
        assert_eq!(format_brl(Decimal::new(1_000_000, 0)), "R$ 1.000.000,00");
        assert_eq!(format_brl(Decimal::new(32975, 3)), "R$ 32,98");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_price_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("10.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1099, 2));
        assert!(serde_json::from_str::<Price>("-2").is_err());
    }
}
