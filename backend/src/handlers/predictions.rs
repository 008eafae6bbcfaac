//! HTTP handler for model-based temperature predictions

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::{find_city, PredictionResult};
use crate::AppState;

/// Get the 7-day temperature prediction for a tracked city
pub async fn get_predictions(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> AppResult<Json<PredictionResult>> {
    let city = find_city(&city).ok_or(AppError::NotFound)?;
    let result = state.forecast.predict_city(city).await?;
    Ok(Json(result))
}
