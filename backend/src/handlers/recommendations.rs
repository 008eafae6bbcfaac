//! HTTP handler for city recommendations

use axum::{extract::State, Json};

use crate::models::Recommendation;
use crate::AppState;

/// Rank all tracked cities by current conditions, best first.
/// Cities whose fetch fails are omitted; the route itself never errors.
pub async fn get_recommendations(State(state): State<AppState>) -> Json<Vec<Recommendation>> {
    Json(state.recommendations.rank_cities().await)
}
