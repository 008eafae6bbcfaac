//! HTTP handlers for current weather and provider forecasts

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::{find_city, CurrentWeather, ForecastEntry};
use crate::AppState;

/// Get current conditions for a tracked city
pub async fn get_current_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<CurrentWeather>> {
    let city = find_city(&city).ok_or(AppError::NotFound)?;
    let current = state.weather.current(city.latitude, city.longitude).await?;
    Ok(Json(current))
}

/// Get the provider's short-term forecast for a tracked city
pub async fn get_provider_forecast(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<Vec<ForecastEntry>>> {
    let city = find_city(&city).ok_or(AppError::NotFound)?;
    let forecast = state.weather.forecast(city.latitude, city.longitude).await?;
    Ok(Json(forecast))
}
