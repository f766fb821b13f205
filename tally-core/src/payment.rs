use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Currency of every session this service opens
pub const PAYMENT_CURRENCY: &str = "usd";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentLineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSessionRequest {
    pub order_id: Uuid,
    pub currency: String,
    pub items: Vec<PaymentLineItem>,
}

impl PaymentSessionRequest {
    /// Sum of `price × quantity` over the lines, or `None` on overflow.
    pub fn amount(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
            item.price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| acc.checked_add(line))
        })
    }
}

/// Opaque handle returned by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSession {
    pub session_id: String, // Provider's ID (e.g., cs_123)
    pub url: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inbound notice that the purchaser paid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfirmation {
    pub order_id: Uuid,
    pub payment_reference: String,
    pub receipt_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider rejected the request: {0}")]
    Rejected(String),
    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session with the provider
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentError>;
}
