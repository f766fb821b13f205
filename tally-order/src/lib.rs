pub mod context;
pub mod manager;
pub mod orchestrator;
pub mod remote;
pub mod transitions;

pub use context::ServiceContext;
pub use manager::OrderManager;
pub use orchestrator::{MockPaymentGateway, PaymentOrchestrator};
pub use transitions::TransitionPolicy;
