use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use api_types::ErrorBody;
pub use server::{ServerState, app, run, run_with_listener, spawn_with_listener};

mod categories;
mod expenses;
mod server;
mod transfer;
mod views;

pub mod types {
    pub mod category {
        pub use api_types::category::{
            CategoryCreate, CategoryListResponse, CategoryUpdate, CategoryView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseCreate, ExpenseListQuery, ExpenseListResponse, ExpenseUpdate, ExpenseView,
        };
    }

    pub mod transfer {
        pub use api_types::transfer::{TransferRequest, TransferResponse};
    }

    pub mod verify {
        pub use api_types::verify::{BalanceIssueView, VerifyResponse};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request: bad JSON, bad id, bad query string.
    Generic(String),
    /// The engine task did not run to completion.
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput(_) | EngineError::SameCategory => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) | EngineError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
