//! Decomposable additive time-series model for temperature forecasting
//!
//! Expresses the signal as piecewise-linear trend + Fourier seasonal
//! components + linear exogenous regressor effects, fit jointly by
//! ridge-stabilized least squares. Prior scales act as per-block ridge
//! weights (`lambda = 1 / scale^2`), a MAP approximation of the usual
//! Gaussian priors. Uncertainty intervals come from the in-sample residual
//! standard deviation.

use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tri-state seasonality toggle, resolved from the data when `Auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seasonality {
    Auto,
    Enabled,
    Disabled,
}

/// One periodic component expressed as a truncated Fourier series
#[derive(Debug, Clone)]
pub struct SeasonalComponent {
    pub name: String,
    pub period_days: f64,
    pub fourier_order: usize,
}

impl SeasonalComponent {
    pub fn new(name: &str, period_days: f64, fourier_order: usize) -> Self {
        Self {
            name: name.to_string(),
            period_days,
            fourier_order,
        }
    }
}

/// Model hyperparameters. Fixed across all requests; see `Default`.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub daily_seasonality: Seasonality,
    pub weekly_seasonality: Seasonality,
    pub yearly_seasonality: Seasonality,
    /// Flexibility of the trend at changepoints
    pub changepoint_prior_scale: f64,
    /// Flexibility of the seasonal components
    pub seasonality_prior_scale: f64,
    /// Flexibility of the exogenous regressor coefficients
    pub regressor_prior_scale: f64,
    /// Number of candidate trend changepoints
    pub n_changepoints: usize,
    /// Fraction of history in which changepoints are placed
    pub changepoint_range: f64,
    /// Extra periodic components beyond the daily/weekly/yearly toggles
    pub extra_seasonalities: Vec<SeasonalComponent>,
    /// Width of the uncertainty interval (0.80 = 80%)
    pub interval_width: f64,
    /// Forecast horizon in days beyond the last training timestamp
    pub horizon_days: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            daily_seasonality: Seasonality::Auto,
            weekly_seasonality: Seasonality::Auto,
            yearly_seasonality: Seasonality::Auto,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            // Approximate monthly cycle
            extra_seasonalities: vec![SeasonalComponent::new("monthly", 30.5, 5)],
            interval_width: 0.80,
            horizon_days: 7,
        }
    }
}

/// Named exogenous regressor column
#[derive(Debug, Clone)]
pub struct RegressorColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Training input: one row per observation
#[derive(Debug, Clone, Default)]
pub struct TrainingTable {
    pub timestamps: Vec<DateTime<Utc>>,
    pub target: Vec<f64>,
    pub regressors: Vec<RegressorColumn>,
    /// Derived calendar feature: month of year per row
    pub months: Vec<u32>,
    /// Derived calendar feature: day of week per row (Monday = 0)
    pub weekdays: Vec<u32>,
}

impl TrainingTable {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Output of [`TemperatureModel::predict`], one entry per requested timestamp
#[derive(Debug, Clone)]
pub struct ModelForecast {
    pub yhat: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub trend: Vec<f64>,
}

#[derive(Debug)]
struct DesignLayout {
    /// Column offset of the first Fourier column per seasonal block
    season_starts: Vec<usize>,
    /// Column offset of the first regressor column
    regressor_start: usize,
    total_columns: usize,
}

/// A fitted decomposable model
#[derive(Debug)]
pub struct TemperatureModel {
    config: ModelConfig,
    t0: DateTime<Utc>,
    /// Seconds spanned by the training window
    t_scale: f64,
    /// Changepoint locations in scaled time units
    changepoints: Vec<f64>,
    /// Seasonal components active after auto resolution
    seasonal: Vec<SeasonalComponent>,
    /// Future regressor values are held at these training-window means
    regressor_means: Vec<f64>,
    beta: Vec<f64>,
    sigma_obs: f64,
    layout: DesignLayout,
}

impl TemperatureModel {
    /// Fit the model on a training table.
    ///
    /// Fails when the table has fewer than 2 distinct timestamps or when a
    /// registered regressor has zero variance.
    pub fn fit(table: &TrainingTable, config: ModelConfig) -> AppResult<Self> {
        let n = table.len();
        let mut distinct = table.timestamps.clone();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(AppError::Fit(format!(
                "at least 2 distinct timestamps required, got {}",
                distinct.len()
            )));
        }

        for regressor in &table.regressors {
            if variance(&regressor.values) == 0.0 {
                return Err(AppError::Fit(format!(
                    "regressor '{}' has zero variance",
                    regressor.name
                )));
            }
        }

        let t0 = table.timestamps[0];
        let last = *table
            .timestamps
            .last()
            .ok_or_else(|| AppError::Fit("empty training table".to_string()))?;
        let t_scale = (last - t0).num_seconds() as f64;

        let t: Vec<f64> = table
            .timestamps
            .iter()
            .map(|ts| (*ts - t0).num_seconds() as f64 / t_scale)
            .collect();
        let t_days: Vec<f64> = table
            .timestamps
            .iter()
            .map(|ts| (*ts - t0).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect();

        let seasonal = resolve_seasonalities(&config, &t_days);
        let changepoints = changepoint_grid(&t, config.n_changepoints, config.changepoint_range);
        let regressor_means: Vec<f64> = table.regressors.iter().map(|r| mean(&r.values)).collect();

        // Assemble the design matrix: intercept, slope, changepoint basis,
        // Fourier blocks, regressor columns.
        let mut layout = DesignLayout {
            season_starts: Vec::new(),
            regressor_start: 0,
            total_columns: 2 + changepoints.len(),
        };
        for component in &seasonal {
            layout.season_starts.push(layout.total_columns);
            layout.total_columns += 2 * component.fourier_order;
        }
        layout.regressor_start = layout.total_columns;
        layout.total_columns += table.regressors.len();

        let mut x = vec![vec![0.0; layout.total_columns]; n];
        for (i, row) in x.iter_mut().enumerate() {
            row[0] = 1.0;
            row[1] = t[i];
            for (j, cp) in changepoints.iter().enumerate() {
                if t[i] >= *cp {
                    row[2 + j] = t[i] - cp;
                }
            }
        }
        for (block, component) in seasonal.iter().enumerate() {
            let features = fourier_series(&t_days, component.period_days, component.fourier_order);
            let start = layout.season_starts[block];
            for (i, feature_row) in features.iter().enumerate() {
                x[i][start..start + feature_row.len()].copy_from_slice(feature_row);
            }
        }
        for (k, regressor) in table.regressors.iter().enumerate() {
            for i in 0..n {
                x[i][layout.regressor_start + k] = regressor.values[i];
            }
        }

        // Per-column ridge penalties derived from the prior scales.
        let mut penalties = vec![1e-8; layout.total_columns];
        for p in penalties
            .iter_mut()
            .take(2 + changepoints.len())
            .skip(2)
        {
            *p = config.changepoint_prior_scale.powi(-2);
        }
        for p in penalties
            .iter_mut()
            .take(layout.regressor_start)
            .skip(2 + changepoints.len())
        {
            *p = config.seasonality_prior_scale.powi(-2);
        }
        for p in penalties.iter_mut().skip(layout.regressor_start) {
            *p = config.regressor_prior_scale.powi(-2);
        }

        let beta = solve_ridge(&x, &table.target, &penalties)
            .ok_or_else(|| AppError::Fit("normal equations are singular".to_string()))?;

        // Residual spread drives the uncertainty interval.
        let mut sq_sum = 0.0;
        for (i, row) in x.iter().enumerate() {
            let fitted: f64 = row.iter().zip(beta.iter()).map(|(a, b)| a * b).sum();
            let residual = table.target[i] - fitted;
            sq_sum += residual * residual;
        }
        let sigma_obs = (sq_sum / n as f64).sqrt().max(1e-6);

        Ok(Self {
            config,
            t0,
            t_scale,
            changepoints,
            seasonal,
            regressor_means,
            beta,
            sigma_obs,
            layout,
        })
    }

    /// Predict at the given timestamps, in-sample or future.
    ///
    /// Regressor values are held constant at their training-window means for
    /// every requested row, matching the deliberate simplification that
    /// exogenous conditions stay at their recent average.
    pub fn predict(&self, timestamps: &[DateTime<Utc>]) -> ModelForecast {
        let n = timestamps.len();
        let t: Vec<f64> = timestamps
            .iter()
            .map(|ts| (*ts - self.t0).num_seconds() as f64 / self.t_scale)
            .collect();
        let t_days: Vec<f64> = timestamps
            .iter()
            .map(|ts| (*ts - self.t0).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect();

        let mut trend = vec![0.0; n];
        for i in 0..n {
            let mut value = self.beta[0] + self.beta[1] * t[i];
            for (j, cp) in self.changepoints.iter().enumerate() {
                if t[i] >= *cp {
                    value += self.beta[2 + j] * (t[i] - cp);
                }
            }
            trend[i] = value;
        }

        let mut seasonal = vec![0.0; n];
        for (block, component) in self.seasonal.iter().enumerate() {
            let features = fourier_series(&t_days, component.period_days, component.fourier_order);
            let start = self.layout.season_starts[block];
            for (i, feature_row) in features.iter().enumerate() {
                for (j, value) in feature_row.iter().enumerate() {
                    seasonal[i] += value * self.beta[start + j];
                }
            }
        }

        let regressor_effect: f64 = self
            .regressor_means
            .iter()
            .enumerate()
            .map(|(k, mean)| self.beta[self.layout.regressor_start + k] * mean)
            .sum();

        let yhat: Vec<f64> = (0..n)
            .map(|i| trend[i] + seasonal[i] + regressor_effect)
            .collect();

        let margin = z_score(self.config.interval_width) * self.sigma_obs;
        let lower = yhat.iter().map(|y| y - margin).collect();
        let upper = yhat.iter().map(|y| y + margin).collect();

        ModelForecast {
            yhat,
            lower,
            upper,
            trend,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

/// Resolve `Auto` toggles from the sampling of the training data, the way
/// Prophet does: a component is enabled only when the data spans at least
/// two of its cycles, and daily seasonality additionally needs sub-daily
/// sampling.
fn resolve_seasonalities(config: &ModelConfig, t_days: &[f64]) -> Vec<SeasonalComponent> {
    let span_days = t_days.last().copied().unwrap_or(0.0);
    let min_spacing = t_days
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);

    let mut components = Vec::new();
    let resolve = |toggle: Seasonality, auto: bool| match toggle {
        Seasonality::Enabled => true,
        Seasonality::Disabled => false,
        Seasonality::Auto => auto,
    };

    if resolve(
        config.daily_seasonality,
        min_spacing < 1.0 && span_days >= 2.0,
    ) {
        components.push(SeasonalComponent::new("daily", 1.0, 4));
    }
    if resolve(config.weekly_seasonality, span_days >= 14.0) {
        components.push(SeasonalComponent::new("weekly", 7.0, 3));
    }
    if resolve(config.yearly_seasonality, span_days >= 730.0) {
        components.push(SeasonalComponent::new("yearly", 365.25, 10));
    }
    components.extend(config.extra_seasonalities.iter().cloned());
    components
}

/// Evenly spaced changepoint candidates over the first `range` fraction of
/// scaled time
fn changepoint_grid(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let cutoff = ((t.len() as f64) * range).floor() as usize;
    let candidates = &t[1..cutoff.max(1).min(t.len())];
    if candidates.is_empty() || n_changepoints == 0 {
        return Vec::new();
    }
    if candidates.len() <= n_changepoints {
        return candidates.to_vec();
    }
    (0..n_changepoints)
        .map(|i| {
            let idx = i * (candidates.len() - 1) / (n_changepoints - 1).max(1);
            candidates[idx]
        })
        .collect()
}

/// Truncated Fourier expansion of `t_days` for one period: per row,
/// `[sin(2pi*1*t/p), cos(2pi*1*t/p), ..., sin(2pi*k*t/p), cos(2pi*k*t/p)]`
fn fourier_series(t_days: &[f64], period_days: f64, order: usize) -> Vec<Vec<f64>> {
    t_days
        .iter()
        .map(|t| {
            let mut row = Vec::with_capacity(2 * order);
            for k in 1..=order {
                let angle = 2.0 * std::f64::consts::PI * (k as f64) * t / period_days;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            row
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Approximate two-sided normal quantile for the interval width
fn z_score(interval_width: f64) -> f64 {
    match (interval_width * 100.0).round() as i32 {
        80 => 1.28,
        90 => 1.645,
        95 => 1.96,
        99 => 2.576,
        _ => 1.28,
    }
}

/// Solve `(X'X + diag(penalties)) beta = X'y` by Gaussian elimination with
/// partial pivoting. Returns `None` when the system is singular beyond what
/// the ridge terms can stabilize.
fn solve_ridge(x: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Option<Vec<f64>> {
    let n = x.len();
    if n == 0 {
        return None;
    }
    let p = x[0].len();
    if p == 0 {
        return Some(Vec::new());
    }

    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    for i in 0..n {
        for a in 0..p {
            let xa = x[i][a];
            xty[a] += xa * y[i];
            for b in 0..p {
                xtx[a][b] += xa * x[i][b];
            }
        }
    }
    for d in 0..p {
        xtx[d][d] += penalties[d];
    }

    let mut a = xtx;
    let mut b = xty;
    for i in 0..p {
        let mut max_row = i;
        let mut max_val = a[i][i].abs();
        for r in (i + 1)..p {
            if a[r][i].abs() > max_val {
                max_val = a[r][i].abs();
                max_row = r;
            }
        }
        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }
        let pivot = a[i][i];
        if pivot.abs() < 1e-12 {
            return None;
        }
        let inv_pivot = 1.0 / pivot;
        for j in i..p {
            a[i][j] *= inv_pivot;
        }
        b[i] *= inv_pivot;
        for r in 0..p {
            if r == i {
                continue;
            }
            let factor = a[r][i];
            if factor == 0.0 {
                continue;
            }
            for j in i..p {
                a[r][j] -= factor * a[i][j];
            }
            b[r] -= factor * b[i];
        }
    }
    Some(b)
}
