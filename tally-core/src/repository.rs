use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::{Order, OrderItem, OrderReceipt, OrderStatus, StoredOrder};
use crate::pagination::PaginationParams;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Outcome of the atomic paid transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPaid {
    Applied,
    /// The order already carries a receipt; nothing was written.
    AlreadyPaid,
    NotFound,
}

/// Everything written by the paid transition, in one transaction.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub payment_reference: String,
    pub paid_at: DateTime<Utc>,
    pub receipt: OrderReceipt,
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order row and all of its items atomically.
    async fn create_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError>;

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<u64, StoreError>;

    /// One page of orders, ordered by creation time then id.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: &PaginationParams,
    ) -> Result<Vec<Order>, StoreError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<StoredOrder>, StoreError>;

    /// Returns the updated order, or `None` if it does not exist.
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    /// Set the paid fields and attach the receipt atomically.
    async fn mark_paid(&self, id: Uuid, payment: &PaymentRecord) -> Result<MarkPaid, StoreError>;
}
