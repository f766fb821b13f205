use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use tally_core::repository::{MarkPaid, OrderRepository, PaymentRecord, StoreError};
use tally_core::{Order, OrderItem, OrderReceipt, OrderStatus, PaginationParams, StoredOrder};

const ORDER_COLUMNS: &str =
    "id, total_amount, total_items, status, paid, paid_at, payment_reference, created_at, updated_at";

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    total_amount: Decimal,
    total_items: i32,
    status: String,
    paid: bool,
    paid_at: Option<DateTime<Utc>>,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;

        Ok(Order {
            id: row.id,
            total_amount: row.total_amount,
            total_items: row.total_items,
            status,
            paid: row.paid,
            paid_at: row.paid_at,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: String,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReceiptRow {
    id: Uuid,
    order_id: Uuid,
    receipt_url: String,
    created_at: DateTime<Utc>,
}

impl From<ReceiptRow> for OrderReceipt {
    fn from(row: ReceiptRow) -> Self {
        OrderReceipt {
            id: row.id,
            order_id: row.order_id,
            receipt_url: row.receipt_url,
            created_at: row.created_at,
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, order: &Order, items: &[OrderItem]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, total_amount, total_items, status, paid, paid_at, payment_reference, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id)
        .bind(order.total_amount)
        .bind(order.total_items)
        .bind(order.status.as_str())
        .bind(order.paid)
        .bind(order.paid_at)
        .bind(order.payment_reference.as_deref())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if !items.is_empty() {
            let mut insert: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO order_items (id, order_id, line_no, product_id, quantity, price) ");
            insert.push_values(items.iter().enumerate(), |mut row, (line_no, item)| {
                row.push_bind(item.id)
                    .push_bind(item.order_id)
                    .push_bind(line_no as i32)
                    .push_bind(item.product_id.as_str())
                    .push_bind(item.quantity)
                    .push_bind(item.price);
            });
            insert.build().execute(&mut *tx).await.map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> Result<u64, StoreError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(total as u64)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: &PaginationParams,
    ) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
            ORDER_COLUMNS
        );

        let offset = i64::try_from(page.offset())
            .map_err(|_| StoreError::Backend(format!("offset {} is out of range", page.offset())))?;

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(i64::from(page.limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<StoredOrder>, StoreError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let receipt: Option<ReceiptRow> = sqlx::query_as(
            "SELECT id, order_id, receipt_url, created_at FROM order_receipts WHERE order_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(Some(StoredOrder {
            order: Order::try_from(row)?,
            items: items.into_iter().map(OrderItem::from).collect(),
            receipt: receipt.map(OrderReceipt::from),
        }))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let sql = format!(
            "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            ORDER_COLUMNS
        );

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Order::try_from).transpose()
    }

    async fn mark_paid(&self, id: Uuid, payment: &PaymentRecord) -> Result<MarkPaid, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Row lock serialises concurrent confirmations for the same order
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
        if locked.is_none() {
            return Ok(MarkPaid::NotFound);
        }

        let has_receipt: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM order_receipts WHERE order_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(backend)?;
        if has_receipt {
            return Ok(MarkPaid::AlreadyPaid);
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, paid = TRUE, paid_at = $2, payment_reference = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(OrderStatus::Paid.as_str())
        .bind(payment.paid_at)
        .bind(payment.payment_reference.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        sqlx::query(
            "INSERT INTO order_receipts (id, order_id, receipt_url, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(payment.receipt.id)
        .bind(id)
        .bind(payment.receipt.receipt_url.as_str())
        .bind(payment.receipt.created_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(MarkPaid::Applied)
    }
}
