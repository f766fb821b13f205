use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tally_core::catalog::{missing_product_ids, CatalogError, Product, ProductCatalog};

/// Product validation backed by the shared `products` table.
pub struct StoreProductCatalog {
    pool: PgPool,
}

impl StoreProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: Decimal,
}

#[async_trait]
impl ProductCatalog for StoreProductCatalog {
    async fn validate_products(&self, product_ids: &[String]) -> Result<Vec<Product>, CatalogError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, price FROM products WHERE id = ANY($1) AND available",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let products: Vec<Product> = rows
            .into_iter()
            .map(|row| Product { id: row.id, name: row.name, price: row.price })
            .collect();

        let missing = missing_product_ids(product_ids, &products);
        if !missing.is_empty() {
            return Err(CatalogError::UnknownProducts(missing));
        }

        Ok(products)
    }
}
