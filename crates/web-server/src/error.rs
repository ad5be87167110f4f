use analytics::AnalyticsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use counters::CounterError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Counter(CounterError::InvalidThreshold(value)) => (
                StatusCode::BAD_REQUEST,
                format!("threshold must be zero or greater, got {value}"),
            ),
            AppError::Counter(CounterError::InvalidInput(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Counter(CounterError::StorageUnavailable(e))
            | AppError::Analytics(AnalyticsError::StorageUnavailable(e)) => {
                tracing::error!(error = %e, "Storage unavailable.");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable".to_string(),
                )
            }
            AppError::Analytics(AnalyticsError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("strategy '{id}' not found"))
            }
            AppError::Analytics(AnalyticsError::InvalidOutcome(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Analytics(overflow @ AnalyticsError::PnlOverflow(_)) => {
                tracing::error!(error = %overflow, "Strategy metrics could not be computed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during analysis".to_string(),
                )
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
