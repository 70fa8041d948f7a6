use crate::error::Result;
use crate::loader::template_csv;
use crate::types::{
    FeatureTable, ForecastPreviewRow, ForecastTable, InsightRow, InsightSet, KpiRow, Kpis, Table,
};
use crate::util::{format_number, format_percent};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table as TextTable, Tabled};
use tracing::info;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

/// Dates as `YYYY-MM-DD`, missing cells as empty fields.
pub fn write_table_csv<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = table.len(), "saved table");
    Ok(())
}

/// Source columns followed by the derived columns that were computed.
pub fn write_features_csv<P: AsRef<Path>>(path: P, features: &FeatureTable) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(features.column_names())?;
    for (i, row) in features.records.rows().iter().enumerate() {
        let fields = row
            .iter()
            .chain(features.derived_cells(i).iter())
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        wtr.write_record(&fields)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = features.len(), "saved features");
    Ok(())
}

/// `ds,yhat,yhat_lower,yhat_upper` with full precision values.
pub fn write_forecast_csv<P: AsRef<Path>>(path: P, forecast: &ForecastTable) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["ds", "yhat", "yhat_lower", "yhat_upper"])?;
    for r in &forecast.rows {
        wtr.write_record([
            r.date.format("%Y-%m-%d").to_string(),
            r.yhat.to_string(),
            r.yhat_lower.to_string(),
            r.yhat_upper.to_string(),
        ])?;
    }
    wtr.flush()?;
    info!(
        path = %path.display(),
        metric = %forecast.metric,
        rows = forecast.len(),
        "saved forecast"
    );
    Ok(())
}

/// Header-only upload template.
pub fn write_template<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    std::fs::write(path, template_csv())?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    TextTable::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table_rows(rows, max_rows));
}

pub fn insight_rows(insights: &InsightSet) -> Vec<InsightRow> {
    insights
        .entries()
        .into_iter()
        .map(|(key, text)| InsightRow {
            key: key.to_string(),
            text: text.to_string(),
        })
        .collect()
}

pub fn kpi_rows(kpis: &Kpis) -> Vec<KpiRow> {
    vec![
        KpiRow {
            name: "Total Revenue".to_string(),
            value: format_number(kpis.total_revenue, 2),
        },
        KpiRow {
            name: "Total Net Profit".to_string(),
            value: format_number(kpis.total_net_profit, 2),
        },
        KpiRow {
            name: "Average ROI".to_string(),
            value: kpis
                .avg_roi
                .map(format_percent)
                .unwrap_or_else(|| "n/a".to_string()),
        },
    ]
}

/// Rows dated after `after` only, so the preview shows the projected weeks.
pub fn forecast_preview_rows(
    forecast: &ForecastTable,
    after: NaiveDate,
) -> Vec<ForecastPreviewRow> {
    forecast
        .rows
        .iter()
        .filter(|r| r.date > after)
        .map(|r| ForecastPreviewRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            yhat: format_number(r.yhat, 2),
            yhat_lower: format_number(r.yhat_lower, 2),
            yhat_upper: format_number(r.yhat_upper, 2),
        })
        .collect()
}
