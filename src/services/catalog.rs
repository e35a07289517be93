//! Product catalog collaborator.
//!
//! The catalog is read-only from the session's point of view. A failing
//! catalog degrades to an empty product list; it never reaches the cart.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::future::Future;
use thiserror::Error;
use validator::Validate;
use crate::domain::aggregates::Product;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("catalog payload malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait Catalog {
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;
}

/// Lists products, logging and swallowing collaborator faults.
/// Products that fail validation are skipped.
pub async fn load_products<C: Catalog>(catalog: &C) -> Vec<Product> {
    match catalog.list_products().await {
        Ok(products) => products.into_iter().filter(|p| match p.validate() {
            Ok(()) => true,
            Err(e) => { tracing::warn!(product_id = %p.id, error = %e, "skipping invalid catalog product"); false }
        }).collect(),
        Err(e) => {
            tracing::error!(error = %e, "failed to load products");
            Vec::new()
        }
    }
}

/// In-memory catalog, e.g. fixtures or a bundled JSON export.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }
    pub fn from_json(json: &str) -> Result<Self, CatalogError> { Ok(Self::new(serde_json::from_str(json)?)) }
}

impl Catalog for StaticCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> { Ok(self.products.clone()) }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
    image_url: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product { id: r.id, name: r.name, price: r.price, image_url: r.image_url, description: r.description, category: r.category }
    }
}

/// Catalog backed by the `products` table of the hosted Postgres database.
#[derive(Clone, Debug)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

impl Catalog for PgCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id::text AS id, name, price::numeric AS price, image_url, description, category \
             FROM products ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// Category plus free-text filter applied on the product listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category.as_deref() != Some(category) { return false; }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&term))
            }
        }
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_deref()) {
        if !seen.contains(&category) { seen.push(category); }
    }
    seen
}
