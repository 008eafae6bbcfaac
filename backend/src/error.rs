//! Error handling for the Weather Insights Platform
//!
//! Provides consistent JSON error responses across all routes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// City is not in the tracked set
    #[error("City not found")]
    NotFound,

    /// Weather provider returned a failure for a current/forecast lookup
    #[error("{0}")]
    Upstream(String),

    /// Historical series was empty after fetching
    #[error("Insufficient historical data")]
    InsufficientData,

    /// Model fitting preconditions violated
    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error response body: `{"error": "<message>"}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_)
            | AppError::InsufficientData
            | AppError::Fit(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Error: {:?}", self);

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_city_maps_to_404() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_pipeline_errors_map_to_500() {
        for err in [
            AppError::Upstream("boom".to_string()),
            AppError::InsufficientData,
            AppError::Fit("too few points".to_string()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
