use std::sync::Arc;
use tally_order::{OrderManager, PaymentOrchestrator, ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderManager>,
    pub payments: Arc<PaymentOrchestrator>,
}

impl AppState {
    pub fn new(ctx: ServiceContext) -> Self {
        let orders = Arc::new(OrderManager::new(Arc::new(ctx)));
        let payments = Arc::new(PaymentOrchestrator::new(orders.clone()));
        Self { orders, payments }
    }
}
