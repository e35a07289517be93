//! Product snapshot
//!
//! A product as captured from the catalog at the moment it was added to
//! the cart, favorites or an order. Later catalog changes never reach a
//! snapshot that was already taken.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{Price, ProductId, ValueError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() { return Err(ValidationError::new("negative_price")); }
    Ok(())
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self { id: id.into(), name: name.into(), price, image_url: None, description: None, category: None }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self { self.category = Some(category.into()); self }
    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = Some(description.into()); self }
    pub fn with_image(mut self, url: impl Into<String>) -> Self { self.image_url = Some(url.into()); self }

    pub fn product_id(&self) -> Result<ProductId, ValueError> { ProductId::new(self.id.as_str()) }
    pub fn unit_price(&self) -> Result<Price, ValueError> { Price::new(self.price) }

    /// Captures an immutable snapshot, rejecting data that would break cart invariants.
    pub fn snapshot(&self) -> Result<ProductSnapshot, ValueError> {
        Ok(ProductSnapshot {
            id: self.product_id()?,
            name: self.name.clone(),
            price: self.unit_price()?,
            image_url: self.image_url.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        })
    }
}

/// Validated, immutable copy of a [`Product`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    id: ProductId,
    name: String,
    price: Price,
    image_url: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

impl ProductSnapshot {
    pub fn id(&self) -> &ProductId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> Price { self.price }
    pub fn image_url(&self) -> Option<&str> { self.image_url.as_deref() }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn category(&self) -> Option<&str> { self.category.as_deref() }
}

impl TryFrom<&Product> for ProductSnapshot {
    type Error = ValueError;
    fn try_from(product: &Product) -> Result<Self, Self::Error> { product.snapshot() }
}
