use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Authoritative product record as returned by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown products: {}", .0.join(", "))]
    UnknownProducts(Vec<String>),
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Ids from `requested` that are absent in `found`, in request order.
pub fn missing_product_ids(requested: &[String], found: &[Product]) -> Vec<String> {
    let known: HashSet<&str> = found.iter().map(|p| p.id.as_str()).collect();
    let mut reported = HashSet::new();
    requested
        .iter()
        .filter(|id| !known.contains(id.as_str()) && reported.insert(id.as_str()))
        .cloned()
        .collect()
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolve every id to its product record.
    ///
    /// Fails with `UnknownProducts` if any id is not in the catalog. Response
    /// order is unspecified.
    async fn validate_products(&self, product_ids: &[String]) -> Result<Vec<Product>, CatalogError>;
}
