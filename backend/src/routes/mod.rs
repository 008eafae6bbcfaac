//! Route definitions for the Weather Insights Platform

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/weather/:city", get(handlers::get_current_weather))
        .route("/forecast/:city", get(handlers::get_provider_forecast))
        .route("/predictions/:city", get(handlers::get_predictions))
        .route("/recommendations", get(handlers::get_recommendations))
}
