use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use tally_core::payment::{
    PaymentConfirmation, PaymentError, PaymentGateway, PaymentLineItem, PaymentSession,
    PaymentSessionRequest, PAYMENT_CURRENCY,
};
use tally_core::{OrderDetails, OrderError, OrderResult};
use crate::manager::OrderManager;
use crate::remote::with_deadline;

/// Opens payment sessions for orders and applies payment confirmations.
pub struct PaymentOrchestrator {
    manager: Arc<OrderManager>,
}

impl PaymentOrchestrator {
    pub fn new(manager: Arc<OrderManager>) -> Self {
        Self { manager }
    }

    /// Load the enriched order and open a session for it.
    #[instrument(skip(self))]
    pub async fn initiate_payment(&self, order_id: Uuid) -> OrderResult<PaymentSession> {
        let details = self.manager.find_one(order_id).await?;
        self.create_session(&details).await
    }

    /// One-shot call to the payment gateway; every call opens a new session.
    pub async fn create_session(&self, details: &OrderDetails) -> OrderResult<PaymentSession> {
        if details.order.paid {
            return Err(OrderError::InvalidInput(format!(
                "Order {} is already paid",
                details.order.id
            )));
        }

        let request = session_request(details);
        let ctx = self.manager.context();
        let session = with_deadline(
            "payment gateway",
            ctx.payment_timeout,
            ctx.payments.create_session(&request),
        )
        .await?
        .map_err(|e| {
            error!(order_id = %details.order.id, "Payment session creation failed: {}", e);
            OrderError::CollaboratorFailure(format!("Payment gateway failure: {}", e))
        })?;

        info!(order_id = %details.order.id, session_id = %session.session_id, "Payment session created");
        Ok(session)
    }

    /// Apply an inbound payment confirmation. Safe to run more than once per order.
    #[instrument(skip(self, confirmation), fields(order_id = %confirmation.order_id))]
    pub async fn confirm_payment(&self, confirmation: PaymentConfirmation) -> OrderResult<OrderDetails> {
        if confirmation.payment_reference.trim().is_empty() {
            warn!("Payment confirmation without a payment reference rejected");
            return Err(OrderError::InvalidInput("payment_reference must not be empty".to_string()));
        }
        if confirmation.receipt_url.trim().is_empty() {
            warn!("Payment confirmation without a receipt url rejected");
            return Err(OrderError::InvalidInput("receipt_url must not be empty".to_string()));
        }

        self.manager
            .mark_paid(
                confirmation.order_id,
                &confirmation.payment_reference,
                &confirmation.receipt_url,
            )
            .await
    }
}

fn session_request(details: &OrderDetails) -> PaymentSessionRequest {
    PaymentSessionRequest {
        order_id: details.order.id,
        currency: PAYMENT_CURRENCY.to_string(),
        items: details
            .items
            .iter()
            .map(|item| PaymentLineItem {
                name: item.product_name.clone(),
                price: item.price,
                quantity: item.quantity,
            })
            .collect(),
    }
}

/// Payment gateway stand-in that hands out hosted-checkout style sessions.
pub struct MockPaymentGateway {
    checkout_base_url: String,
    success_url: String,
    cancel_url: String,
}

impl MockPaymentGateway {
    pub fn new(checkout_base_url: String, success_url: String, cancel_url: String) -> Self {
        Self {
            checkout_base_url: checkout_base_url.trim_end_matches('/').to_string(),
            success_url,
            cancel_url,
        }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new(
            "https://pay.example.com/checkout".to_string(),
            "https://shop.example.com/payments/success".to_string(),
            "https://shop.example.com/payments/cancel".to_string(),
        )
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, PaymentError> {
        if request.items.is_empty() {
            return Err(PaymentError::Rejected("session needs at least one line item".to_string()));
        }
        if !request.amount().is_some_and(|amount| amount > Decimal::ZERO) {
            return Err(PaymentError::Rejected("amount must be greater than zero".to_string()));
        }

        let session_id = format!("cs_mock_{}", Uuid::new_v4().simple());
        Ok(PaymentSession {
            url: format!("{}/{}", self.checkout_base_url, session_id),
            session_id,
            success_url: Some(self.success_url.clone()),
            cancel_url: Some(self.cancel_url.clone()),
            created_at: Utc::now(),
        })
    }
}
