use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use tally_core::catalog::{missing_product_ids, CatalogError, Product, ProductCatalog};
use tally_core::repository::{MarkPaid, OrderRepository, PaymentRecord, StoreError};
use tally_core::{Order, OrderItem, OrderStatus, PaginationParams, StoredOrder};

/// A thread-safe in-memory order store.
///
/// Every trait method takes the write or read lock once, so each call is
/// atomic with respect to the others.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, StoredOrder>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(orders: &HashMap<Uuid, StoredOrder>, status: Option<OrderStatus>) -> Vec<Order> {
        let mut matching: Vec<Order> = orders
            .values()
            .map(|stored| &stored.order)
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matching
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Backend(format!("duplicate order id {}", order.id)));
        }
        orders.insert(
            order.id,
            StoredOrder { order: order.clone(), items: items.to_vec(), receipt: None },
        );
        Ok(())
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<u64, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|stored| status.map_or(true, |s| stored.order.status == s))
            .count() as u64)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: &PaginationParams,
    ) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(Self::sorted(&orders, status)
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .collect())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<StoredOrder>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).map(|stored| {
            stored.order.status = status;
            stored.order.updated_at = Utc::now();
            stored.order.clone()
        }))
    }

    async fn mark_paid(&self, id: Uuid, payment: &PaymentRecord) -> Result<MarkPaid, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(stored) = orders.get_mut(&id) else {
            return Ok(MarkPaid::NotFound);
        };
        if stored.receipt.is_some() {
            return Ok(MarkPaid::AlreadyPaid);
        }

        stored.order.status = OrderStatus::Paid;
        stored.order.paid = true;
        stored.order.paid_at = Some(payment.paid_at);
        stored.order.payment_reference = Some(payment.payment_reference.clone());
        stored.order.updated_at = Utc::now();
        stored.receipt = Some(payment.receipt.clone());
        Ok(MarkPaid::Applied)
    }
}

/// In-process product catalog for tests and local runs.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            products: Arc::new(RwLock::new(map)),
            calls: Arc::default(),
        }
    }

    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    pub async fn remove(&self, product_id: &str) {
        self.products.write().await.remove(product_id);
    }

    /// Number of validation requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn validate_products(&self, product_ids: &[String]) -> Result<Vec<Product>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let products = self.products.read().await;

        let mut found: Vec<Product> = Vec::new();
        for id in product_ids {
            if let Some(product) = products.get(id) {
                if !found.iter().any(|p| &p.id == id) {
                    found.push(product.clone());
                }
            }
        }

        let missing = missing_product_ids(product_ids, &found);
        if !missing.is_empty() {
            return Err(CatalogError::UnknownProducts(missing));
        }
        Ok(found)
    }
}
