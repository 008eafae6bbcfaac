//! Domain types for the Weather Insights Platform

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked city with its GPS coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// The fixed set of cities the platform tracks
pub const TRACKED_CITIES: [City; 6] = [
    City {
        name: "Dehradun",
        latitude: 30.3165,
        longitude: 78.0322,
    },
    City {
        name: "Jaipur",
        latitude: 26.9124,
        longitude: 75.7873,
    },
    City {
        name: "Mumbai",
        latitude: 19.0760,
        longitude: 72.8777,
    },
    City {
        name: "Kolkata",
        latitude: 22.5726,
        longitude: 88.3639,
    },
    City {
        name: "Chennai",
        latitude: 13.0827,
        longitude: 80.2707,
    },
    City {
        name: "Delhi",
        latitude: 28.6139,
        longitude: 77.2090,
    },
];

/// Look up a tracked city by name (exact match)
pub fn find_city(name: &str) -> Option<&'static City> {
    TRACKED_CITIES.iter().find(|c| c.name == name)
}

/// One historical weather observation for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
}

/// Ordered historical observations for one city over a date range.
///
/// Timestamps are strictly increasing, one observation per calendar day.
/// Days whose fetch failed are simply absent, never imputed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    pub city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: Vec<Observation>,
}

impl HistoricalSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Current conditions as returned by the weather provider
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: i64,
    pub description: String,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub pressure: i64,
    pub visibility: i64,
    pub clouds: i64,
    pub timestamp: DateTime<Utc>,
    /// Coarse weather category ("clear", "rain", ...), used for ranking
    #[serde(skip)]
    pub condition: String,
}

/// One entry of the provider's short-term forecast
#[derive(Debug, Clone, Serialize)]
pub struct ForecastEntry {
    pub temperature: f64,
    pub humidity: i64,
    pub description: String,
    pub timestamp: String,
}

/// One predicted day with uncertainty bounds and decomposed trend
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub date: String,
    pub temperature: f64,
    pub temperature_lower: f64,
    pub temperature_upper: f64,
    pub trend: f64,
    pub confidence_score: f64,
}

/// Summary of the fitted model's in-sample quality
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub confidence_score: f64,
    pub mean_absolute_error: f64,
    pub training_days: usize,
}

/// Full prediction output for one city: 7 forecast days plus model summary
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub predictions: Vec<ForecastPoint>,
    pub model_info: ModelInfo,
}

/// One ranked recommendation entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub city: String,
    pub score: i32,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_city_lookup() {
        let mumbai = find_city("Mumbai").unwrap();
        assert!((mumbai.latitude - 19.0760).abs() < 1e-9);
        assert!((mumbai.longitude - 72.8777).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert!(find_city("mumbai").is_none());
        assert!(find_city("Atlantis").is_none());
    }

    #[test]
    fn test_six_cities_tracked() {
        assert_eq!(TRACKED_CITIES.len(), 6);
    }
}
