use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tally_core::{ErrorClass, OrderError};

#[derive(Debug)]
pub enum AppError {
    Order(OrderError),
    BadRequest(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Order(OrderError::InvalidInput(_)) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Order(OrderError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Order(OrderError::CollaboratorFailure(_)) => StatusCode::BAD_GATEWAY,
            AppError::Order(OrderError::PersistenceFailure(_)) | AppError::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (class, message) = match self {
            AppError::Order(err) => {
                if err.class() == ErrorClass::ServerError {
                    tracing::error!("Request failed: {}", err);
                }
                (err.class(), err.message().to_string())
            }
            AppError::BadRequest(msg) => (ErrorClass::ClientError, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (ErrorClass::ServerError, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": class.as_str(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
