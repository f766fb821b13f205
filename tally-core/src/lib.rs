pub mod models;
pub mod pagination;
pub mod repository;
pub mod catalog;
pub mod payment;

pub use models::{NewOrderItem, Order, OrderDetails, OrderItem, OrderItemDetails, OrderReceipt, OrderStatus, StoredOrder};
pub use pagination::{PageMeta, Paginated, PaginationParams};

/// Caller-facing classification of a workflow failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ClientError,
    NotFound,
    ServerError,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::ClientError => "client_error",
            ErrorClass::NotFound => "not_found",
            ErrorClass::ServerError => "server_error",
        }
    }
}

/// The uniform error every order workflow returns.
///
/// Collaborator and store errors never cross a workflow boundary as-is; they
/// are rewrapped into one of these kinds with a descriptive message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl OrderError {
    pub fn class(&self) -> ErrorClass {
        match self {
            OrderError::InvalidInput(_) => ErrorClass::ClientError,
            OrderError::NotFound(_) => ErrorClass::NotFound,
            OrderError::CollaboratorFailure(_) | OrderError::PersistenceFailure(_) => ErrorClass::ServerError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OrderError::InvalidInput(msg)
            | OrderError::NotFound(msg)
            | OrderError::CollaboratorFailure(msg)
            | OrderError::PersistenceFailure(msg) => msg,
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
