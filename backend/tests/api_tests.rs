//! HTTP surface tests
//!
//! Routes are exercised against a state whose provider endpoint is
//! unreachable: unknown-city lookups must resolve before any provider
//! traffic, and recommendation failures must be omitted rather than
//! surfaced.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use weather_insights_backend::config::{Config, ServerConfig, WeatherConfig};
use weather_insights_backend::{create_app, AppState};

/// State wired against a dead provider endpoint
fn unreachable_state() -> AppState {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        weather: WeatherConfig {
            // Reserved discard port: connections fail immediately
            api_endpoint: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
        },
    };
    AppState::from_config(config).expect("state construction")
}

async fn get(path: &str) -> (StatusCode, serde_json::Value) {
    let app = create_app(unreachable_state());
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_app(unreachable_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_city_returns_404_on_every_city_route() {
    for route in [
        "/api/weather/Atlantis",
        "/api/forecast/Atlantis",
        "/api/predictions/Atlantis",
    ] {
        let (status, body) = get(route).await;
        // Resolves without touching the (unreachable) provider
        assert_eq!(status, StatusCode::NOT_FOUND, "route {}", route);
        assert_eq!(body["error"], "City not found", "route {}", route);
    }
}

#[tokio::test]
async fn test_city_lookup_is_case_sensitive() {
    let (status, _) = get("/api/weather/mumbai").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_500_with_error_field() {
    let (status, body) = get("/api/weather/Mumbai").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommendations_omit_failing_cities() {
    let (status, body) = get("/api/recommendations").await;
    // Every city fetch fails: an empty ranking, not a top-level error
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}
