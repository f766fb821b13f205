use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use tally_core::payment::PaymentSession;
use tally_core::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE};
use tally_core::{NewOrderItem, Order, OrderDetails, OrderError, OrderStatus, Paginated, PaginationParams};
use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse::<OrderStatus>()
        .map_err(|e| AppError::Order(OrderError::InvalidInput(e)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(change_order_status))
        .route("/orders/{id}/payment-session", post(create_payment_session))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetails>), AppError> {
    let Json(req) = payload?;
    let order = state.orders.create(req.items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders?status=&page=&limit=
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let Query(query) = query?;
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let page = PaginationParams {
        page: query.page.unwrap_or(DEFAULT_PAGE),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
    };

    Ok(Json(state.orders.find_all(status, page).await?))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderDetails>, AppError> {
    let Path(order_id) = id?;
    Ok(Json(state.orders.find_one(order_id).await?))
}

/// PATCH /orders/{id}/status
pub async fn change_order_status(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> Result<Json<OrderDetails>, AppError> {
    let Path(order_id) = id?;
    let Json(req) = payload?;
    let status = parse_status(&req.status)?;
    Ok(Json(state.orders.change_status(order_id, status).await?))
}

/// POST /orders/{id}/payment-session
pub async fn create_payment_session(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<(StatusCode, Json<PaymentSession>), AppError> {
    let Path(order_id) = id?;
    let session = state.payments.initiate_payment(order_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}
