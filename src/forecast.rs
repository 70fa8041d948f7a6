//! Weekly forecasting with an additive trend + yearly seasonality model.
//!
//! The model is a penalized linear regression on:
//!
//! - a piecewise-linear trend (intercept, slope and slope changes at
//!   changepoints spread over the early part of the history),
//! - a Fourier series for yearly seasonality.
//!
//! The trend is fitted first on the mean-centered series, with the level
//! and slope unpenalized and a Gaussian prior on the slope changes.
//! Seasonality is then fitted to the trend residuals under its own prior,
//! so a history shorter than a year cannot push the level into the Fourier
//! terms. Both stages are ridge solves of the normal equations. The future
//! trend keeps the final slope; its uncertainty grows with the horizon
//! according to how often and how strongly the slope changed in the history.

use crate::config::ForecastConfig;
use crate::error::{AnalyticsError, Result};
use crate::types::{FeatureTable, ForecastRow, ForecastTable};
use crate::util::week_end;
use chrono::{Datelike, Days, NaiveDate};
use ndarray::{s, Array1, Array2, Axis};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::{debug, info, warn};

const YEAR_DAYS: f64 = 365.25;
const UNIX_EPOCH_FROM_CE: i32 = 719_163;
const SIGMA_ITERATIONS: usize = 5;
const MIN_SIGMA_SQ: f64 = 1e-4;
const JITTER: f64 = 1e-9;

/// Trend and seasonal contributions for one historical week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentRow {
    pub date: NaiveDate,
    pub trend: f64,
    pub yearly: f64,
}

/// A fitted forecasting model. Holds what a renderer needs to redraw the
/// history and its components; the solver state is private.
#[derive(Debug, Clone)]
pub struct FittedModel {
    metric: String,
    history: Vec<(NaiveDate, f64)>,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    offset: f64,
    changepoints: Vec<f64>,
    fourier_order: usize,
    beta: Array1<f64>,
    sigma: f64,
    z: f64,
    changepoint_rate: f64,
    delta_scale: f64,
}

impl FittedModel {
    pub fn fit(
        metric: &str,
        history: Vec<(NaiveDate, f64)>,
        config: &ForecastConfig,
    ) -> Result<Self> {
        config.validate()?;
        if history.len() < 2 {
            return Err(AnalyticsError::Forecast(format!(
                "need at least 2 weekly periods to fit '{}', found {}",
                metric,
                history.len()
            )));
        }
        if history.iter().any(|(_, y)| !y.is_finite()) {
            return Err(AnalyticsError::Forecast(format!(
                "series '{}' contains non-finite values",
                metric
            )));
        }

        let start = history[0].0;
        let end = history[history.len() - 1].0;
        let span_days = (end - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(AnalyticsError::Forecast(
                "history must span more than one date".to_string(),
            ));
        }

        let y_scale = history.iter().map(|(_, y)| y.abs()).fold(0.0, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let n = history.len();
        let ts: Vec<f64> = history
            .iter()
            .map(|(d, _)| (*d - start).num_days() as f64 / span_days)
            .collect();

        let hist_size = (n as f64 * config.changepoint_range).floor() as usize;
        let n_cp = config.n_changepoints.min(hist_size.saturating_sub(1));
        let changepoints: Vec<f64> = if n_cp == 0 {
            Vec::new()
        } else {
            (1..=n_cp)
                .map(|j| {
                    let idx = (j as f64 * (hist_size - 1) as f64 / n_cp as f64).round() as usize;
                    ts[idx]
                })
                .collect()
        };

        let mut model = FittedModel {
            metric: metric.to_string(),
            history,
            start,
            span_days,
            y_scale,
            offset: 0.0,
            changepoints,
            fourier_order: config.yearly_fourier_order,
            beta: Array1::zeros(0),
            sigma: 0.0,
            z: normal_quantile(0.5 + config.interval_width / 2.0),
            changepoint_rate: 0.0,
            delta_scale: 0.0,
        };

        // Trend first on the centered series, then seasonality on its residuals.
        let n_trend = 2 + n_cp;
        let mut x = Array2::<f64>::zeros((n, model.n_params()));
        for (i, (d, _)) in model.history.iter().enumerate() {
            for (j, v) in model.design_row(*d).into_iter().enumerate() {
                x[[i, j]] = v;
            }
        }
        let y = Array1::from_iter(model.history.iter().map(|(_, v)| v / y_scale));
        model.offset = y.mean().unwrap_or(0.0);
        let centered = y.mapv(|v| v - model.offset);
        let initial_sigma_sq = (centered.mapv(|v| v * v).sum() / n as f64).max(MIN_SIGMA_SQ);

        let x_trend = x.slice(s![.., ..n_trend]).to_owned();
        let mut trend_prior = vec![None, None];
        trend_prior.extend(std::iter::repeat(Some(config.changepoint_prior_scale)).take(n_cp));
        let (trend_beta, trend_sigma_sq) =
            ridge_fit(&x_trend, &centered, &trend_prior, initial_sigma_sq, metric)?;

        let x_season = x.slice(s![.., n_trend..]).to_owned();
        let residual = &centered - &x_trend.dot(&trend_beta);
        let season_prior = vec![Some(config.seasonality_prior_scale); x_season.ncols()];
        let (season_beta, sigma_sq) =
            ridge_fit(&x_season, &residual, &season_prior, trend_sigma_sq, metric)?;
        model.sigma = sigma_sq.sqrt();

        let deltas = trend_beta.slice(s![2..]);
        model.delta_scale = if n_cp > 0 {
            deltas.mapv(f64::abs).sum() / n_cp as f64
        } else {
            0.0
        };
        // Changepoints per unit of scaled time; the history spans [0, 1].
        model.changepoint_rate = n_cp as f64;
        model.beta = ndarray::concatenate(Axis(0), &[trend_beta.view(), season_beta.view()])
            .map_err(|e| AnalyticsError::Forecast(format!("could not fit '{}': {}", metric, e)))?;

        debug!(
            metric,
            weeks = n,
            changepoints = n_cp,
            sigma = model.sigma * y_scale,
            "fitted forecast model"
        );
        Ok(model)
    }

    fn n_params(&self) -> usize {
        2 + self.changepoints.len() + 2 * self.fourier_order
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    fn design_row(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let mut row = Vec::with_capacity(self.n_params());
        row.push(t);
        row.push(1.0);
        row.extend(self.changepoints.iter().map(|c| (t - c).max(0.0)));
        row.extend(fourier_terms(date, self.fourier_order));
        row
    }

    fn trend_scaled(&self, row: &[f64]) -> f64 {
        let n_trend = 2 + self.changepoints.len();
        self.offset
            + row[..n_trend]
                .iter()
                .zip(self.beta.iter())
                .map(|(x, b)| x * b)
                .sum::<f64>()
    }

    fn yearly_scaled(&self, row: &[f64]) -> f64 {
        let n_trend = 2 + self.changepoints.len();
        row[n_trend..]
            .iter()
            .zip(self.beta.iter().skip(n_trend))
            .map(|(x, b)| x * b)
            .sum()
    }

    /// Point forecast and interval for each date.
    pub fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastRow> {
        dates
            .iter()
            .map(|&date| {
                let row = self.design_row(date);
                let yhat = (self.trend_scaled(&row) + self.yearly_scaled(&row)) * self.y_scale;
                let horizon = (self.scaled_time(date) - 1.0).max(0.0);
                let trend_var = 2.0
                    * self.changepoint_rate
                    * self.delta_scale.powi(2)
                    * horizon.powi(3)
                    / 3.0;
                let band = self.z * (self.sigma.powi(2) + trend_var).sqrt() * self.y_scale;
                ForecastRow {
                    date,
                    yhat,
                    yhat_lower: yhat - band,
                    yhat_upper: yhat + band,
                }
            })
            .collect()
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Weekly series the model was trained on.
    pub fn history(&self) -> &[(NaiveDate, f64)] {
        &self.history
    }

    /// Last training week.
    pub fn cutoff(&self) -> NaiveDate {
        self.history
            .last()
            .map(|(d, _)| *d)
            .unwrap_or(self.start)
    }

    pub fn changepoints(&self) -> Vec<NaiveDate> {
        self.changepoints
            .iter()
            .filter_map(|t| {
                let days = (t * self.span_days).round() as u64;
                self.start.checked_add_days(Days::new(days))
            })
            .collect()
    }

    /// Residual standard deviation in the metric's units.
    pub fn sigma(&self) -> f64 {
        self.sigma * self.y_scale
    }

    pub fn components(&self) -> Vec<ComponentRow> {
        self.history
            .iter()
            .map(|(date, _)| {
                let row = self.design_row(*date);
                ComponentRow {
                    date: *date,
                    trend: self.trend_scaled(&row) * self.y_scale,
                    yearly: self.yearly_scaled(&row) * self.y_scale,
                }
            })
            .collect()
    }
}

pub fn forecast(features: &FeatureTable, metric: &str) -> Result<(ForecastTable, FittedModel)> {
    forecast_with(features, metric, &ForecastConfig::default())
}

pub fn forecast_with(
    features: &FeatureTable,
    metric: &str,
    config: &ForecastConfig,
) -> Result<(ForecastTable, FittedModel)> {
    config.validate()?;
    let points = metric_points(features, metric, config.december_anchor)?;
    let weekly = resample_weekly(&points);
    if weekly.len() < 2 {
        return Err(AnalyticsError::Forecast(format!(
            "'{}' covers {} weekly period(s); at least 2 are needed to fit a seasonal trend",
            metric,
            weekly.len()
        )));
    }

    let model = FittedModel::fit(metric, weekly, config)?;
    let cutoff = model.cutoff();
    let mut dates: Vec<NaiveDate> = model.history().iter().map(|(d, _)| *d).collect();
    dates.extend(
        (1..=config.horizon_weeks as u64).filter_map(|k| cutoff.checked_add_days(Days::new(7 * k))),
    );
    let rows = model.predict(&dates);
    info!(
        metric,
        history_weeks = model.history().len(),
        horizon_weeks = config.horizon_weeks,
        "forecast complete"
    );
    Ok((
        ForecastTable {
            metric: metric.to_string(),
            rows,
        },
        model,
    ))
}

/// `(date, value)` pairs for a metric, with the December anchor appended
/// when the data stops before December.
pub fn metric_points(
    features: &FeatureTable,
    metric: &str,
    december_anchor: bool,
) -> Result<Vec<(NaiveDate, Option<f64>)>> {
    let values = features
        .series(metric)?
        .ok_or_else(|| AnalyticsError::MissingColumn {
            needed_by: "forecast",
            missing: vec![metric.to_string()],
        })?;
    let dates = features.records.dates()?;
    if values.iter().flatten().any(|v| v.is_infinite()) {
        return Err(AnalyticsError::Forecast(format!(
            "'{}' contains infinite values",
            metric
        )));
    }
    let mut points: Vec<(NaiveDate, Option<f64>)> = dates
        .into_iter()
        .zip(values)
        .map(|(d, v)| (d, v.filter(|x| !x.is_nan())))
        .collect();

    let Some(last) = points.iter().map(|(d, _)| *d).max() else {
        return Ok(points);
    };
    if december_anchor && last.month() != 12 {
        let carried = points.iter().find(|(d, _)| *d == last).and_then(|(_, v)| *v);
        if let Some(anchor) = NaiveDate::from_ymd_opt(last.year(), 12, 1) {
            debug!(%anchor, value = ?carried, "appending December anchor");
            points.push((anchor, carried));
        }
    }
    Ok(points)
}

/// Weekly totals keyed by the Sunday ending each week. Weeks without data
/// between the first and last observation are present with a total of 0.
pub fn resample_weekly(points: &[(NaiveDate, Option<f64>)]) -> Vec<(NaiveDate, f64)> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (d, v) in points {
        *buckets.entry(week_end(*d)).or_insert(0.0) += v.unwrap_or(0.0);
    }
    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut week = first;
    while week <= last {
        out.push((week, buckets.get(&week).copied().unwrap_or(0.0)));
        match week.checked_add_days(Days::new(7)) {
            Some(next) => week = next,
            None => {
                warn!(%week, "calendar overflow while resampling");
                break;
            }
        }
    }
    out
}

fn fourier_terms(date: NaiveDate, order: usize) -> Vec<f64> {
    let epoch_days = (date.num_days_from_ce() - UNIX_EPOCH_FROM_CE) as f64;
    let mut terms = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * epoch_days / YEAR_DAYS;
        terms.push(angle.sin());
        terms.push(angle.cos());
    }
    terms
}

/// Ridge regression with a Gaussian prior per column (`None` leaves the
/// column unpenalized). The noise variance is re-estimated between solves.
/// Returns the coefficients and the final residual variance.
fn ridge_fit(
    x: &Array2<f64>,
    y: &Array1<f64>,
    prior_sd: &[Option<f64>],
    initial_sigma_sq: f64,
    metric: &str,
) -> Result<(Array1<f64>, f64)> {
    let p = x.ncols();
    let n = x.nrows() as f64;
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let mut sigma_sq = initial_sigma_sq.max(MIN_SIGMA_SQ);
    let mut beta = Array1::zeros(p);
    for _ in 0..SIGMA_ITERATIONS {
        let mut a = xtx.clone();
        for (j, sd) in prior_sd.iter().enumerate() {
            if let Some(sd) = sd {
                a[[j, j]] += sigma_sq / (sd * sd) + JITTER;
            }
        }
        beta = cholesky_solve(&a, &xty).ok_or_else(|| {
            AnalyticsError::Forecast(format!("could not fit '{}': singular system", metric))
        })?;
        let resid = y - &x.dot(&beta);
        sigma_sq = (resid.mapv(|r| r * r).sum() / n).max(MIN_SIGMA_SQ);
    }
    Ok((beta, sigma_sq))
}

/// Solve `a x = b` for symmetric positive definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    Some(x)
}

/// Inverse of the standard normal CDF (Acklam's rational approximation).
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.38357751867269e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p < 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, Table};
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn features(points: &[(NaiveDate, f64)]) -> FeatureTable {
        let rows = points
            .iter()
            .map(|(date, v)| vec![Cell::Date(*date), Cell::Number(*v)])
            .collect();
        crate::metrics::extract(&Table::new(vec!["date".into(), "revenue".into()], rows))
    }

    fn sundays(from: NaiveDate, weeks: u64) -> Vec<NaiveDate> {
        (0..weeks)
            .map(|k| from.checked_add_days(Days::new(7 * k)).unwrap())
            .collect()
    }

    #[test]
    fn quantile_matches_known_values() {
        assert_relative_eq!(normal_quantile(0.9), 1.2815515655, epsilon = 1e-6);
        assert_relative_eq!(normal_quantile(0.975), 1.959963985, epsilon = 1e-6);
        assert_relative_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal_quantile(0.01), -2.326347874, epsilon = 1e-6);
    }

    #[test]
    fn fourier_terms_use_unix_days() {
        let terms = fourier_terms(d(1970, 1, 1), 2);
        assert_eq!(terms, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn cholesky_solves_spd_system() {
        let a = ndarray::arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let b = ndarray::arr1(&[2.0, 1.0]);
        let x = cholesky_solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-12);
        assert!(cholesky_solve(&ndarray::arr2(&[[0.0]]), &ndarray::arr1(&[1.0])).is_none());
    }

    #[test]
    fn weekly_totals_fill_gaps() {
        // Mon 2024-01-01 and Wed 2024-01-03 share the week ending Sun 2024-01-07.
        let points = vec![
            (d(2024, 1, 1), Some(10.0)),
            (d(2024, 1, 3), Some(5.0)),
            (d(2024, 1, 20), Some(7.0)),
            (d(2024, 1, 21), None),
        ];
        let weekly = resample_weekly(&points);
        assert_eq!(
            weekly,
            vec![
                (d(2024, 1, 7), 15.0),
                (d(2024, 1, 14), 0.0),
                (d(2024, 1, 21), 7.0),
            ]
        );
    }

    #[test]
    fn december_anchor_carries_latest_value() {
        let f = features(&[(d(2023, 6, 4), 3.0), (d(2023, 6, 11), 8.0)]);
        let points = metric_points(&f, "revenue", true).unwrap();
        assert_eq!(points.last(), Some(&(d(2023, 12, 1), Some(8.0))));

        let weekly = resample_weekly(&points);
        assert_eq!(weekly.len(), 27);
        assert_eq!(weekly.last(), Some(&(d(2023, 12, 3), 8.0)));
        assert!(weekly[2..26].iter().all(|(_, v)| *v == 0.0));

        let plain = metric_points(&f, "revenue", false).unwrap();
        assert_eq!(plain.len(), 2);
    }

    #[test]
    fn no_anchor_when_data_ends_in_december() {
        let f = features(&[(d(2023, 12, 3), 3.0), (d(2023, 12, 10), 8.0)]);
        assert_eq!(metric_points(&f, "revenue", true).unwrap().len(), 2);
    }

    #[test]
    fn single_week_is_a_forecast_error() {
        let f = features(&[(d(2023, 12, 4), 3.0), (d(2023, 12, 6), 8.0)]);
        assert!(matches!(forecast(&f, "revenue"), Err(AnalyticsError::Forecast(_))));
    }

    #[test]
    fn unknown_metric_is_missing_column() {
        let f = features(&[(d(2023, 12, 3), 3.0), (d(2023, 12, 10), 8.0)]);
        assert!(matches!(
            forecast(&f, "orders"),
            Err(AnalyticsError::MissingColumn { .. })
        ));
    }

    #[test]
    fn twelve_weeks_give_history_plus_horizon() {
        let dates = sundays(d(2023, 10, 1), 12);
        let points: Vec<(NaiveDate, f64)> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let wiggle = if i % 2 == 0 { 40.0 } else { -40.0 };
                (*date, 1000.0 + 25.0 * i as f64 + wiggle)
            })
            .collect();
        let (table, model) = forecast(&features(&points), "revenue").unwrap();

        assert_eq!(table.len(), 12 + 26);
        assert_eq!(model.history().len(), 12);
        assert_eq!(model.cutoff(), d(2023, 12, 17));
        assert_eq!(table.rows[12].date, d(2023, 12, 24));
        assert_eq!(table.rows[37].date, d(2024, 6, 16));
        for row in &table.rows {
            assert!(row.yhat.is_finite());
            assert!(row.yhat_upper >= row.yhat && row.yhat >= row.yhat_lower);
        }
        let last_hist = table.rows[11];
        let last_future = table.rows[37];
        assert!(
            last_future.yhat_upper - last_future.yhat_lower
                >= last_hist.yhat_upper - last_hist.yhat_lower
        );
        assert_eq!(model.components().len(), 12);
        assert!(table.future_dip(model.cutoff()).is_some());
    }

    #[test]
    fn constant_series_stays_flat() {
        let points: Vec<(NaiveDate, f64)> = sundays(d(2023, 7, 2), 26)
            .into_iter()
            .map(|date| (date, 50.0))
            .collect();
        let (table, model) = forecast(&features(&points), "revenue").unwrap();
        assert_eq!(table.len(), 26 + 26);
        for row in &table.rows {
            assert_relative_eq!(row.yhat, 50.0, epsilon = 1e-6);
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        }
        for c in model.components() {
            assert_relative_eq!(c.trend, 50.0, epsilon = 1e-6);
            assert_relative_eq!(c.yearly, 0.0, epsilon = 1e-6);
        }
        assert!(model.sigma() < 1.0);
    }

    #[test]
    fn straight_line_extrapolates_without_seasonal_swing() {
        let points: Vec<(NaiveDate, f64)> = sundays(d(2023, 7, 2), 26)
            .into_iter()
            .enumerate()
            .map(|(k, date)| (date, 100.0 + 2.0 * k as f64))
            .collect();
        let (table, _) = forecast(&features(&points), "revenue").unwrap();
        for (k, row) in table.rows.iter().enumerate() {
            assert_relative_eq!(row.yhat, 100.0 + 2.0 * k as f64, epsilon = 1e-2);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let f = features(&[(d(2023, 12, 3), 3.0), (d(2023, 12, 10), 8.0)]);
        let cfg = ForecastConfig {
            horizon_weeks: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(
            forecast_with(&f, "revenue", &cfg),
            Err(AnalyticsError::Config(_))
        ));
    }
}
