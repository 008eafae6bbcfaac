//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions, short-term
//! forecasts and point-in-time historical lookups

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{CurrentWeather, ForecastEntry, Observation};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Weather API client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    weather: Vec<OwmWeather>,
    main: OwmMain,
    visibility: Option<i64>,
    wind: OwmWind,
    clouds: OwmClouds,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    deg: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: i64,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    main: OwmMain,
    weather: Vec<OwmWeather>,
    dt_txt: String,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String, base_url: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn current(&self, latitude: f64, longitude: f64) -> AppResult<CurrentWeather> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let data: OwmCurrentResponse = self.get_json(&url).await?;
        Ok(convert_current(data))
    }

    /// Fetch the provider's multi-day forecast by GPS coordinates
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> AppResult<Vec<ForecastEntry>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let data: OwmForecastResponse = self.get_json(&url).await?;
        Ok(data
            .list
            .into_iter()
            .map(|item| ForecastEntry {
                temperature: item.main.temp,
                humidity: item.main.humidity as i64,
                description: item
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_default(),
                timestamp: item.dt_txt,
            })
            .collect())
    }

    /// Fetch a single point-in-time observation by GPS coordinates.
    ///
    /// The returned observation is stamped with the requested instant, not
    /// the provider's own `dt`, so the historical series stays on the
    /// caller's daily grid.
    pub async fn point_in_time(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> AppResult<Observation> {
        let url = format!(
            "{}/weather?lat={}&lon={}&dt={}&appid={}&units=metric",
            self.base_url,
            latitude,
            longitude,
            at.timestamp(),
            self.api_key
        );

        let data: OwmCurrentResponse = self.get_json(&url).await?;
        Ok(Observation {
            timestamp: at,
            temperature: data.main.temp,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            wind_speed: data.wind.speed,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse weather response: {}", e)))
    }
}

fn convert_current(data: OwmCurrentResponse) -> CurrentWeather {
    let (condition, description) = data
        .weather
        .first()
        .map(|w| (w.main.to_lowercase(), w.description.clone()))
        .unwrap_or_default();

    CurrentWeather {
        temperature: data.main.temp,
        humidity: data.main.humidity as i64,
        description,
        wind_speed: data.wind.speed,
        wind_deg: data.wind.deg.unwrap_or(0),
        pressure: data.main.pressure as i64,
        visibility: data.visibility.unwrap_or(0),
        clouds: data.clouds.all,
        timestamp: Utc
            .timestamp_opt(data.dt, 0)
            .single()
            .unwrap_or_else(Utc::now),
        condition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_response() {
        let raw = r#"{
            "weather": [{"main": "Clouds", "description": "scattered clouds"}],
            "main": {"temp": 28.4, "pressure": 1009, "humidity": 74},
            "visibility": 10000,
            "wind": {"speed": 4.1, "deg": 250},
            "clouds": {"all": 40},
            "dt": 1700000000
        }"#;
        let data: OwmCurrentResponse = serde_json::from_str(raw).unwrap();
        let current = convert_current(data);

        assert_eq!(current.condition, "clouds");
        assert_eq!(current.description, "scattered clouds");
        assert_eq!(current.humidity, 74);
        assert_eq!(current.wind_deg, 250);
        assert_eq!(current.clouds, 40);
        assert!((current.temperature - 28.4).abs() < 1e-9);
    }

    #[test]
    fn test_parse_current_response_missing_optionals() {
        let raw = r#"{
            "weather": [{"main": "Haze", "description": "haze"}],
            "main": {"temp": 31.0, "pressure": 1004, "humidity": 55},
            "wind": {"speed": 2.0},
            "clouds": {"all": 0},
            "dt": 1700000000
        }"#;
        let data: OwmCurrentResponse = serde_json::from_str(raw).unwrap();
        let current = convert_current(data);

        assert_eq!(current.wind_deg, 0);
        assert_eq!(current.visibility, 0);
    }

    #[test]
    fn test_parse_forecast_response() {
        let raw = r#"{
            "list": [
                {
                    "main": {"temp": 27.0, "pressure": 1010, "humidity": 70},
                    "weather": [{"main": "Clear", "description": "clear sky"}],
                    "dt_txt": "2024-06-01 12:00:00"
                }
            ]
        }"#;
        let data: OwmForecastResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.list.len(), 1);
        assert_eq!(data.list[0].dt_txt, "2024-06-01 12:00:00");
    }
}
