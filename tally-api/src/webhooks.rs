use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tally_core::payment::PaymentConfirmation;
use tally_core::OrderDetails;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/payments", post(handle_payment_confirmation))
}

/// POST /webhooks/payments
/// Receive payment confirmations from the payment service. Deliveries may repeat.
pub async fn handle_payment_confirmation(
    State(state): State<AppState>,
    payload: Result<Json<PaymentConfirmation>, JsonRejection>,
) -> Result<Json<OrderDetails>, AppError> {
    let Json(confirmation) = payload?;
    tracing::info!(
        "Received payment confirmation {} for order {}",
        confirmation.payment_reference,
        confirmation.order_id
    );

    let order = state.payments.confirm_payment(confirmation).await?;
    Ok(Json(order))
}
