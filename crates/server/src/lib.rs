use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod items;
mod server;
mod transactions;
mod user;

pub mod types {
    pub mod item {
        pub use api_types::item::{
            ItemListResponse, ItemNew, ItemStatus, ItemStatusUpdate, ItemUpdate, ItemView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            ApprovalDecision, BulkCheckoutNew, BulkCheckoutResponse, CheckoutLineNew, CheckoutNew,
            ExtendNew, ReturnNew, TransactionKind, TransactionList, TransactionListResponse,
            TransactionStatus, TransactionView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::InvariantViolation(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::Validation(_)
        | EngineError::InsufficientQuantity { .. }
        | EngineError::InvalidStateTransition(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvariantViolation(detail) => {
            tracing::error!("invariant violation: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
