//! Historical weather data fetching and caching
//!
//! Fetches one point-in-time observation per calendar day, strictly
//! sequentially, degrading per-day on provider failures. Fetched series are
//! cached by (city, start_date, end_date) for a fixed duration.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::AppResult;
use crate::external::WeatherClient;
use crate::models::{City, HistoricalSeries, Observation};

/// How long a cached historical series stays fresh, in seconds, measured
/// from fetch completion
pub const CACHE_DURATION_SECS: i64 = 3600;

/// How many days of history are fetched for model training
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

fn cache_duration() -> Duration {
    Duration::seconds(CACHE_DURATION_SECS)
}

/// Clock abstraction so cache expiry is testable
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of single-day historical observations.
///
/// Implemented by [`WeatherClient`]; tests substitute counting fakes.
pub trait ObservationSource: Send + Sync {
    fn observation_at(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = AppResult<Observation>> + Send;
}

impl ObservationSource for WeatherClient {
    fn observation_at(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = AppResult<Observation>> + Send {
        self.point_in_time(latitude, longitude, at)
    }
}

/// Outcome of one historical fetch, distinguishing fully fetched ranges from
/// ranges with silently dropped days
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub requested_days: usize,
    pub fetched_days: usize,
    pub failed_dates: Vec<NaiveDate>,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    city: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: HistoricalSeries,
    fetched_at: DateTime<Utc>,
}

/// In-memory TTL cache for historical series.
///
/// The mutex is held only for synchronous map access; concurrent requests
/// for the same key may both miss and re-fetch. The worst case is a
/// redundant provider round trip, which staleness tolerance makes acceptable.
#[derive(Debug, Default)]
pub struct HistoryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<HistoricalSeries> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| now - entry.fetched_at < cache_duration())
            .map(|entry| entry.series.clone())
    }

    fn insert(&self, key: CacheKey, series: HistoricalSeries, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                series,
                fetched_at: now,
            },
        );
    }
}

/// Service assembling historical series for model training
#[derive(Clone)]
pub struct HistoryService<S> {
    source: S,
    cache: Arc<HistoryCache>,
    clock: Arc<dyn Clock>,
}

impl<S: ObservationSource> HistoryService<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: Arc::new(HistoryCache::new()),
            clock,
        }
    }

    /// Fetch up to `days + 1` daily observations over `[now - days, now]`.
    ///
    /// Issues one provider request per calendar day, sequentially. Days whose
    /// request fails are logged and recorded in the report, never raised, so
    /// the series may be shorter than the requested range. A cached series
    /// for the exact (city, start, end) key younger than
    /// [`CACHE_DURATION_SECS`] is returned verbatim without any provider
    /// traffic.
    pub async fn fetch_historical(
        &self,
        city: &City,
        days: i64,
    ) -> AppResult<(HistoricalSeries, FetchReport)> {
        let end = self.clock.now();
        let start = end - Duration::days(days);
        let key = CacheKey {
            city: city.name.to_string(),
            start_date: start.date_naive(),
            end_date: end.date_naive(),
        };

        if let Some(series) = self.cache.get(&key, self.clock.now()) {
            tracing::debug!(city = city.name, "historical series served from cache");
            let report = FetchReport {
                requested_days: series.len(),
                fetched_days: series.len(),
                failed_dates: Vec::new(),
                from_cache: true,
            };
            return Ok((series, report));
        }

        let mut observations = Vec::new();
        let mut report = FetchReport::default();

        // One remote round trip at a time, oldest day first.
        let mut current = start;
        while current <= end {
            report.requested_days += 1;
            match self
                .source
                .observation_at(city.latitude, city.longitude, current)
                .await
            {
                Ok(observation) => {
                    report.fetched_days += 1;
                    observations.push(observation);
                }
                Err(e) => {
                    tracing::warn!(
                        city = city.name,
                        date = %current.date_naive(),
                        "Error fetching historical data: {}",
                        e
                    );
                    report.failed_dates.push(current.date_naive());
                }
            }
            current += Duration::days(1);
        }

        let series = HistoricalSeries {
            city: city.name.to_string(),
            start_date: key.start_date,
            end_date: key.end_date,
            observations,
        };
        self.cache.insert(key, series.clone(), self.clock.now());

        Ok((series, report))
    }
}
