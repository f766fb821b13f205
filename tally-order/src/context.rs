use std::sync::Arc;
use std::time::Duration;
use tally_core::catalog::ProductCatalog;
use tally_core::payment::PaymentGateway;
use tally_core::repository::OrderRepository;
use crate::transitions::TransitionPolicy;

pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles to every collaborator the workflows need.
///
/// Built once at startup and shared by `Arc`; holds no mutable state of its own.
#[derive(Clone)]
pub struct ServiceContext {
    pub orders: Arc<dyn OrderRepository>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub payments: Arc<dyn PaymentGateway>,
    pub catalog_timeout: Duration,
    pub payment_timeout: Duration,
    pub transitions: TransitionPolicy,
}

impl ServiceContext {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            orders,
            catalog,
            payments,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
            transitions: TransitionPolicy::default(),
        }
    }

    pub fn with_timeouts(mut self, catalog: Duration, payment: Duration) -> Self {
        self.catalog_timeout = catalog;
        self.payment_timeout = payment;
        self
    }

    pub fn with_transitions(mut self, policy: TransitionPolicy) -> Self {
        self.transitions = policy;
        self
    }
}
