//! Prediction pipeline integration tests
//!
//! Exercises the forecasting pipeline end to end on synthetic series:
//! confidence bounds and formula, horizon length, bound ordering and
//! degenerate inputs.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use weather_insights_backend::error::AppError;
use weather_insights_backend::models::{HistoricalSeries, Observation};
use weather_insights_backend::services::forecast::{confidence_from_mae, predict_from_series};

fn daily_series(temperatures: &[f64]) -> HistoricalSeries {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let observations: Vec<Observation> = temperatures
        .iter()
        .enumerate()
        .map(|(i, t)| Observation {
            timestamp: start + Duration::days(i as i64),
            temperature: *t,
            humidity: 55.0 + (i % 5) as f64,
            pressure: 1005.0 + (i % 4) as f64,
            wind_speed: 2.0 + (i % 3) as f64,
        })
        .collect();
    HistoricalSeries {
        city: "Jaipur".to_string(),
        start_date: start.date_naive(),
        end_date: (start + Duration::days(temperatures.len().max(1) as i64 - 1)).date_naive(),
        observations,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_empty_series_fails_with_insufficient_data() {
    let series = daily_series(&[]);
    let err = predict_from_series(&series).unwrap_err();
    assert!(matches!(err, AppError::InsufficientData));
}

#[test]
fn test_single_observation_fails_fit() {
    let series = daily_series(&[28.0]);
    let err = predict_from_series(&series).unwrap_err();
    assert!(matches!(err, AppError::Fit(_)));
}

#[test]
fn test_prediction_result_shape() {
    let temperatures: Vec<f64> = (0..31).map(|i| 24.0 + (i as f64 / 5.0).cos()).collect();
    let result = predict_from_series(&daily_series(&temperatures)).unwrap();

    assert_eq!(result.predictions.len(), 7);
    assert_eq!(result.model_info.training_days, 31);
    assert!(result.model_info.mean_absolute_error >= 0.0);

    let confidence = result.model_info.confidence_score;
    assert!((0.0..=100.0).contains(&confidence));
    for point in &result.predictions {
        assert_eq!(point.confidence_score, confidence);
        assert!(point.temperature_lower <= point.temperature);
        assert!(point.temperature <= point.temperature_upper);
        assert!(point.trend.is_finite());
    }
}

#[test]
fn test_mumbai_scenario() {
    let mut series = daily_series(&[28.0, 29.0, 27.5]);
    series.city = "Mumbai".to_string();
    for observation in &mut series.observations {
        observation.humidity = 72.0;
        observation.pressure = 1009.0;
        observation.wind_speed = 4.0;
    }

    let result = predict_from_series(&series).unwrap();

    assert_eq!(result.predictions.len(), 7);
    let mae = result.model_info.mean_absolute_error;
    assert!(mae.is_finite() && mae >= 0.0);
    let confidence = result.predictions[0].confidence_score;
    for point in &result.predictions {
        assert_eq!(point.confidence_score, confidence);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_confidence_always_bounded(mae in 0.0..1.0e6f64) {
        let confidence = confidence_from_mae(mae);
        prop_assert!((0.0..=100.0).contains(&confidence));
    }

    #[test]
    fn prop_confidence_is_linear_in_range(mae in 0.0..10.0f64) {
        let expected = 100.0 * (1.0 - mae / 10.0);
        prop_assert!((confidence_from_mae(mae) - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_confidence_zero_beyond_ten_degrees(mae in 10.0..1.0e6f64) {
        prop_assert_eq!(confidence_from_mae(mae), 0.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_seven_ordered_forecast_points(
        temperatures in proptest::collection::vec(15.0..40.0f64, 3..35)
    ) {
        let result = predict_from_series(&daily_series(&temperatures)).unwrap();
        prop_assert_eq!(result.predictions.len(), 7);
        for point in &result.predictions {
            prop_assert!(point.temperature_lower <= point.temperature);
            prop_assert!(point.temperature <= point.temperature_upper);
        }
        prop_assert!((0.0..=100.0).contains(&result.model_info.confidence_score));
    }
}
