// Tunables for the pipeline stages. Everything has a `Default` matching the
// dashboard's fixed behavior; the CLI overrides individual fields.
use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Weekly periods predicted past the last historical week.
    pub horizon_weeks: usize,
    /// Coverage of the uncertainty band, in (0, 1).
    pub interval_width: f64,
    pub yearly_fourier_order: usize,
    pub n_changepoints: usize,
    /// Share of the history in which trend changepoints may be placed.
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    /// Append a December 1st point carrying the latest value when the data
    /// stops before December.
    pub december_anchor: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_weeks: 26,
            interval_width: 0.8,
            yearly_fourier_order: 10,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            december_anchor: true,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon_weeks == 0 {
            return Err(AnalyticsError::Config(
                "horizon_weeks must be at least 1".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(AnalyticsError::Config(format!(
                "interval_width {} must be between 0 and 1 (exclusive)",
                self.interval_width
            )));
        }
        if !(0.0..=1.0).contains(&self.changepoint_range) {
            return Err(AnalyticsError::Config(format!(
                "changepoint_range {} must be between 0 and 1",
                self.changepoint_range
            )));
        }
        if self.changepoint_prior_scale <= 0.0 || self.seasonality_prior_scale <= 0.0 {
            return Err(AnalyticsError::Config(
                "prior scales must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Rows whose total cost / revenue exceeds this are flagged.
    pub cost_ratio_threshold: f64,
    pub top_products: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            cost_ratio_threshold: 0.8,
            top_products: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub forecast: ForecastConfig,
    pub insights: InsightConfig,
    pub forecast_metrics: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            insights: InsightConfig::default(),
            forecast_metrics: vec!["revenue".to_string(), "net_profit".to_string()],
        }
    }
}
