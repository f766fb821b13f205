use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use crate::{OrderError, OrderResult};

/// Decimal places kept for prices and totals (`NUMERIC(12, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, MONEY_SCALE);

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// A requested line item, as supplied by the caller at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i32, price: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    /// `price × quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// The purchase record. Totals are a snapshot taken at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub total_amount: Decimal,
    pub total_items: i32,
    pub status: OrderStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending order and its items from the requested lines.
    ///
    /// The caller-supplied unit price is what gets summed and stored, at
    /// `MONEY_SCALE` places. Fails when the total does not fit in `MAX_AMOUNT`.
    pub fn place(requested: &[NewOrderItem]) -> OrderResult<(Order, Vec<OrderItem>)> {
        let total_items = i32::try_from(requested.len()).map_err(|_| {
            OrderError::InvalidInput(format!("Order has too many items ({})", requested.len()))
        })?;
        let total_amount = requested
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| {
                line.line_total().and_then(|total| acc.checked_add(total))
            })
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(|| {
                OrderError::InvalidInput(format!("Order total exceeds {}", MAX_AMOUNT))
            })?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            total_amount: money(total_amount),
            total_items,
            status: OrderStatus::Pending,
            paid: false,
            paid_at: None,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        };

        let items = requested
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: money(line.price),
            })
            .collect();

        Ok((order, items))
    }
}

fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(MONEY_SCALE);
    amount
}

/// One persisted line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Proof of payment, attached once when the order is paid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderReceipt {
    pub id: Uuid,
    pub order_id: Uuid,
    pub receipt_url: String,
    pub created_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn new(order_id: Uuid, receipt_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            receipt_url,
            created_at: Utc::now(),
        }
    }
}

/// An order as loaded from the store, with its nested rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub receipt: Option<OrderReceipt>,
}

impl StoredOrder {
    pub fn product_ids(&self) -> Vec<String> {
        distinct_product_ids(self.items.iter().map(|item| item.product_id.as_str()))
    }
}

/// Read-time view of an order line, carrying the catalog name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemDetails {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// An order enriched with product names. The names are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetails>,
    pub receipt: Option<OrderReceipt>,
}

/// Dedupe product ids, keeping first-seen order.
pub fn distinct_product_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
