//! Temperature prediction pipeline
//!
//! Shapes a historical series into a training table, fits the decomposable
//! model, forecasts 7 days ahead and derives a confidence score from the
//! in-sample mean absolute error.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{City, ForecastPoint, HistoricalSeries, ModelInfo, PredictionResult};
use crate::services::history::{HistoryService, ObservationSource, DEFAULT_HISTORY_DAYS};
use crate::services::model::{ModelConfig, RegressorColumn, TemperatureModel, TrainingTable};

/// Covariates considered for exogenous regression, in registration order
const COVARIATES: [&str; 3] = ["humidity", "pressure", "wind_speed"];

/// Project a historical series into the table shape the model requires:
/// timestamp, target temperature, available covariate columns and derived
/// calendar features.
///
/// Covariate columns with zero variance are left unregistered; a constant
/// column carries no signal and would otherwise fail the model's degenerate
/// regressor check.
///
/// Fails with `InsufficientData` when the series has no rows, before any
/// model configuration happens.
pub fn build_training_table(series: &HistoricalSeries) -> AppResult<TrainingTable> {
    if series.is_empty() {
        return Err(AppError::InsufficientData);
    }

    let observations = &series.observations;
    let mut table = TrainingTable {
        timestamps: observations.iter().map(|o| o.timestamp).collect(),
        target: observations.iter().map(|o| o.temperature).collect(),
        regressors: Vec::new(),
        months: observations.iter().map(|o| o.timestamp.month()).collect(),
        weekdays: observations
            .iter()
            .map(|o| o.timestamp.weekday().num_days_from_monday())
            .collect(),
    };

    for name in COVARIATES {
        let values: Vec<f64> = observations
            .iter()
            .map(|o| match name {
                "humidity" => o.humidity,
                "pressure" => o.pressure,
                _ => o.wind_speed,
            })
            .collect();
        if has_variance(&values) {
            table.regressors.push(RegressorColumn {
                name: name.to_string(),
                values,
            });
        } else {
            tracing::debug!(covariate = name, "skipping constant covariate column");
        }
    }

    Ok(table)
}

fn has_variance(values: &[f64]) -> bool {
    values
        .first()
        .map(|first| values.iter().any(|v| v != first))
        .unwrap_or(false)
}

/// Map in-sample MAE to a bounded confidence percentage.
///
/// An MAE of 0 degrees yields 100, an MAE of 10 degrees or more yields 0.
/// A linear heuristic, not a calibrated probability.
pub fn confidence_from_mae(mae: f64) -> f64 {
    (100.0 * (1.0 - mae / 10.0)).clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fit the model on a series and produce the 7-day prediction result.
///
/// Exposed separately from [`ForecastService`] so the pipeline is testable
/// on synthetic series without a weather provider.
pub fn predict_from_series(series: &HistoricalSeries) -> AppResult<PredictionResult> {
    let table = build_training_table(series)?;
    let config = ModelConfig::default();
    let horizon = config.horizon_days;
    let model = TemperatureModel::fit(&table, config)?;

    let last = *table
        .timestamps
        .last()
        .ok_or(AppError::InsufficientData)?;
    let future: Vec<DateTime<Utc>> = (1..=horizon as i64)
        .map(|offset| last + Duration::days(offset))
        .collect();

    let mut requested = table.timestamps.clone();
    requested.extend(future.iter().copied());
    let forecast = model.predict(&requested);

    // Restrict to the in-sample overlap for the error metric: the first
    // rows of the request are exactly the training timestamps.
    let n = table.len();
    let mae = table
        .target
        .iter()
        .zip(forecast.yhat.iter())
        .map(|(actual, fitted)| (actual - fitted).abs())
        .sum::<f64>()
        / n as f64;
    let confidence = round1(confidence_from_mae(mae));

    let predictions = (0..horizon)
        .map(|i| ForecastPoint {
            date: future[i].format("%Y-%m-%d").to_string(),
            temperature: round1(forecast.yhat[n + i]),
            temperature_lower: round1(forecast.lower[n + i]),
            temperature_upper: round1(forecast.upper[n + i]),
            trend: forecast.trend[n + i],
            confidence_score: confidence,
        })
        .collect();

    Ok(PredictionResult {
        predictions,
        model_info: ModelInfo {
            confidence_score: confidence,
            mean_absolute_error: round2(mae),
            training_days: n,
        },
    })
}

/// Service tying the historical fetch to the forecasting pipeline
#[derive(Clone)]
pub struct ForecastService<S> {
    history: HistoryService<S>,
}

impl<S: ObservationSource> ForecastService<S> {
    pub fn new(history: HistoryService<S>) -> Self {
        Self { history }
    }

    /// Produce the 7-day temperature prediction for a tracked city
    pub async fn predict_city(&self, city: &City) -> AppResult<PredictionResult> {
        let (series, report) = self
            .history
            .fetch_historical(city, DEFAULT_HISTORY_DAYS)
            .await?;
        if !report.failed_dates.is_empty() {
            tracing::info!(
                city = city.name,
                fetched = report.fetched_days,
                failed = report.failed_dates.len(),
                "training on a partially fetched series"
            );
        }
        predict_from_series(&series)
    }
}
