use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed, empty or out-of-range input. Never reaches a collaborator.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The movie catalogue could not be read
    #[error("Catalogue unavailable: {0}")]
    CatalogueUnavailable(String),

    /// The analysis history could not be read or written
    #[error("History store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may reasonably retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::CatalogueUnavailable(_) | AppError::StoreUnavailable(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, message) = match self {
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::CatalogueUnavailable(_) | AppError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}

// Bodies, query strings and path segments the extractors refuse are all
// caller mistakes and answer with the same JSON error shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
