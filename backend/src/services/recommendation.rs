//! Travel recommendation ranking from current conditions
//!
//! Independent of the forecasting pipeline: each tracked city is scored on
//! its current temperature and weather category, then ranked descending.
//! Cities whose current-conditions fetch fails are omitted, not reported.

use std::future::Future;

use crate::error::AppResult;
use crate::external::WeatherClient;
use crate::models::{CurrentWeather, Recommendation, TRACKED_CITIES};

/// Weather categories that disqualify the mild-weather bonus
const POOR_CONDITIONS: [&str; 3] = ["rain", "storm", "snow"];

/// Source of current conditions for ranking.
///
/// Implemented by [`WeatherClient`]; tests substitute fakes.
pub trait CurrentConditionsSource: Send + Sync {
    fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = AppResult<CurrentWeather>> + Send;
}

impl CurrentConditionsSource for WeatherClient {
    fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = AppResult<CurrentWeather>> + Send {
        self.current(latitude, longitude)
    }
}

/// Score current conditions: 3 points for a temperature in [20, 30],
/// 2 for [15, 35]; 2 points for clear or cloudy skies, 1 for anything
/// that is not rain, storm or snow.
pub fn score_conditions(temperature: f64, condition: &str) -> i32 {
    let mut score = 0;
    if (20.0..=30.0).contains(&temperature) {
        score += 3;
    } else if (15.0..=35.0).contains(&temperature) {
        score += 2;
    }

    if condition == "clear" || condition == "clouds" {
        score += 2;
    } else if !POOR_CONDITIONS.contains(&condition) {
        score += 1;
    }
    score
}

/// Render a temperature for the reason string. Whole degrees keep one
/// decimal ("26.0"), since the value is a measurement, not a count.
fn format_temperature(temperature: f64) -> String {
    if temperature.fract() == 0.0 {
        format!("{:.1}", temperature)
    } else {
        temperature.to_string()
    }
}

/// Service ranking tracked cities by current conditions
#[derive(Clone)]
pub struct RecommendationService<S> {
    source: S,
}

impl<S: CurrentConditionsSource> RecommendationService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Rank all tracked cities, best first. Never fails as a whole: cities
    /// whose fetch fails are dropped from the ranking.
    pub async fn rank_cities(&self) -> Vec<Recommendation> {
        let mut recommendations = Vec::with_capacity(TRACKED_CITIES.len());

        for city in &TRACKED_CITIES {
            let current = match self
                .source
                .current_conditions(city.latitude, city.longitude)
                .await
            {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(city = city.name, "skipping city in ranking: {}", e);
                    continue;
                }
            };

            let score = score_conditions(current.temperature, &current.condition);
            recommendations.push(Recommendation {
                city: city.name.to_string(),
                score,
                reason: format!(
                    "Current temperature: {}°C, Weather: {}",
                    format_temperature(current.temperature),
                    current.condition
                ),
            });
        }

        recommendations.sort_by(|a, b| b.score.cmp(&a.score));
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_conditions_score_five() {
        assert_eq!(score_conditions(25.0, "clear"), 5);
        assert_eq!(score_conditions(20.0, "clouds"), 5);
        assert_eq!(score_conditions(30.0, "clear"), 5);
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(score_conditions(17.0, "clear"), 4);
        assert_eq!(score_conditions(35.0, "clear"), 4);
        assert_eq!(score_conditions(40.0, "clear"), 2);
        assert_eq!(score_conditions(10.0, "clear"), 2);
    }

    #[test]
    fn test_weather_categories() {
        // Haze is neither favored nor poor
        assert_eq!(score_conditions(25.0, "haze"), 4);
        assert_eq!(score_conditions(25.0, "rain"), 3);
        assert_eq!(score_conditions(25.0, "storm"), 3);
        assert_eq!(score_conditions(25.0, "snow"), 3);
    }

    #[test]
    fn test_worst_case_scores_zero() {
        assert_eq!(score_conditions(-5.0, "snow"), 0);
    }

    use crate::error::AppError;
    use chrono::Utc;

    /// Fake source with fixed conditions per city; unknown cities fail
    struct FixedConditions(Vec<(&'static str, f64, &'static str)>);

    impl CurrentConditionsSource for &FixedConditions {
        async fn current_conditions(
            &self,
            latitude: f64,
            _longitude: f64,
        ) -> AppResult<CurrentWeather> {
            let city = TRACKED_CITIES
                .iter()
                .find(|c| (c.latitude - latitude).abs() < 1e-9)
                .map(|c| c.name)
                .unwrap_or_default();
            let (_, temperature, condition) = self
                .0
                .iter()
                .find(|(name, _, _)| *name == city)
                .ok_or_else(|| AppError::Upstream("synthetic outage".to_string()))?;
            Ok(CurrentWeather {
                temperature: *temperature,
                humidity: 60,
                description: condition.to_string(),
                wind_speed: 3.0,
                wind_deg: 180,
                pressure: 1010,
                visibility: 10_000,
                clouds: 20,
                timestamp: Utc::now(),
                condition: condition.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_ranking_sorted_and_failures_omitted() {
        let conditions = FixedConditions(vec![
            ("Mumbai", 26.0, "clear"),
            ("Delhi", 41.0, "haze"),
            ("Chennai", 31.0, "rain"),
            // Cold enough to forfeit both temperature bands
            ("Jaipur", 12.0, "clouds"),
            // Dehradun and Kolkata unavailable
        ]);
        let service = RecommendationService::new(&conditions);

        let ranking = service.rank_cities().await;

        assert_eq!(ranking.len(), 4);
        for pair in ranking.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(ranking[0].city, "Mumbai");
        assert_eq!(ranking[0].score, 5);
        assert_eq!(
            ranking[0].reason,
            "Current temperature: 26.0°C, Weather: clear"
        );
    }

    #[test]
    fn test_temperature_renders_with_decimal() {
        assert_eq!(format_temperature(26.0), "26.0");
        assert_eq!(format_temperature(26.5), "26.5");
        assert_eq!(format_temperature(31.55), "31.55");
        assert_eq!(format_temperature(-2.0), "-2.0");
    }
}
