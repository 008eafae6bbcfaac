//! Weather Insights Platform - Backend
//!
//! Proxies OpenWeatherMap for a fixed set of cities and serves short-horizon
//! temperature predictions from a per-request decomposable time-series model.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;

use external::WeatherClient;
use services::{ForecastService, HistoryService, RecommendationService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: WeatherClient,
    pub forecast: ForecastService<WeatherClient>,
    pub recommendations: RecommendationService<WeatherClient>,
}

impl AppState {
    /// Wire up the client and services from configuration
    pub fn from_config(config: Config) -> crate::error::AppResult<Self> {
        let weather = WeatherClient::new(
            config.weather.api_key.clone(),
            config.weather.api_endpoint.clone(),
        )?;
        let forecast = ForecastService::new(HistoryService::new(weather.clone()));
        let recommendations = RecommendationService::new(weather.clone());
        Ok(Self {
            config: Arc::new(config),
            weather,
            forecast,
            recommendations,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Weather Insights Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
