//! Business analytics pipeline for tabular financial records.
//!
//! A raw CSV is validated and cleaned ([`loader`]), enriched with derived
//! ratios ([`metrics`]), then summarised as textual insights ([`insights`])
//! and projected forward as weekly forecasts ([`forecast`]).
//!
//! ```ignore
//! use business_insights::{loader, run_pipeline, PipelineConfig};
//!
//! let raw = loader::read_csv("data/raw/business_data.csv")?;
//! let out = run_pipeline(&raw, &PipelineConfig::default())?;
//! println!("{}", out.insights.best_region);
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod types;
pub mod util;

pub use config::{ForecastConfig, InsightConfig, PipelineConfig};
pub use error::{AnalyticsError, DataIssue, Result};
pub use forecast::{forecast, forecast_with, FittedModel};
pub use insights::{
    generate_insights, generate_insights_with, kpis, revenue_by_region, top_products,
};
pub use loader::{
    read_csv, read_csv_from, validate, validate_with_report, LoadReport, REQUIRED_COLUMNS,
};
pub use metrics::extract;
pub use types::{
    Cell, FeatureFilter, FeatureTable, ForecastRow, ForecastTable, InsightSet, Kpis, Table,
};

use tracing::info;

/// Everything one pass over a dataset produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean: Table,
    pub report: LoadReport,
    pub features: FeatureTable,
    pub insights: InsightSet,
    pub kpis: Kpis,
    pub forecasts: Vec<(ForecastTable, FittedModel)>,
}

/// Validate, extract, summarise and forecast in one call. Any stage error
/// aborts the run.
pub fn run_pipeline(raw: &Table, config: &PipelineConfig) -> Result<PipelineOutput> {
    let (clean, report) = validate_with_report(raw)?;
    let features = extract(&clean);
    let insights = generate_insights_with(&features, &config.insights)?;
    let kpis = kpis(&features)?;
    let forecasts = config
        .forecast_metrics
        .iter()
        .map(|metric| forecast_with(&features, metric, &config.forecast))
        .collect::<Result<Vec<_>>>()?;
    info!(
        rows = clean.len(),
        forecasts = forecasts.len(),
        "pipeline complete"
    );
    Ok(PipelineOutput {
        clean,
        report,
        features,
        insights,
        kpis,
        forecasts,
    })
}
