use crate::config::InsightConfig;
use crate::error::{AnalyticsError, DataIssue, Result};
use crate::types::{FeatureTable, InsightSet, Kpis};
use crate::util::{
    average, format_int, format_number, format_percent, mean_finite, month_label, pearson,
};
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Columns the insight rules read.
pub const INSIGHT_COLUMNS: [&str; 11] = [
    "date",
    "revenue",
    "region",
    "product_name",
    "employee_count",
    "net_profit",
    "cogs",
    "marketing_cost",
    "new_customers_acquired",
    "operating_expense",
    "units_sold",
];

pub const NEGATIVE_STAFFING: &str =
    "Higher employee count is negatively correlated with net profit. Consider optimizing team size.";
pub const POSITIVE_STAFFING: &str = "Higher employee count positively contributes to net profit.";
pub const NO_STAFFING_RELATION: &str =
    "No significant relationship found between employee count and profit.";

pub fn generate_insights(features: &FeatureTable) -> Result<InsightSet> {
    generate_insights_with(features, &InsightConfig::default())
}

pub fn generate_insights_with(
    features: &FeatureTable,
    config: &InsightConfig,
) -> Result<InsightSet> {
    let missing: Vec<String> = INSIGHT_COLUMNS
        .iter()
        .filter(|c| !features.records.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalyticsError::MissingColumn {
            needed_by: "insight generation",
            missing,
        });
    }
    if features.is_empty() {
        return Err(DataIssue::NoRows.into());
    }

    let records = &features.records;
    let dates = records.dates()?;
    let revenue = required_numbers(features, "revenue")?;
    let net_profit = required_numbers(features, "net_profit")?;
    let cogs = required_numbers(features, "cogs")?;
    let opex = required_numbers(features, "operating_expense")?;
    let marketing = required_numbers(features, "marketing_cost")?;
    let new_customers = required_numbers(features, "new_customers_acquired")?;
    let employees = required_numbers(features, "employee_count")?;

    // Monthly revenue, ties resolved to the earliest month.
    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (d, r) in dates.iter().zip(&revenue) {
        *monthly.entry((d.year(), d.month())).or_insert(0.0) += r;
    }
    let ((top_y, top_m), top_rev) = arg_extreme(&monthly, Ordering::Greater)
        .ok_or(DataIssue::NoRows)?;
    let ((low_y, low_m), low_rev) = arg_extreme(&monthly, Ordering::Less)
        .ok_or(DataIssue::NoRows)?;

    let high_cost = (0..revenue.len())
        .filter(|&i| {
            let total_cost = opex[i] + marketing[i] + cogs[i];
            total_cost / revenue[i] > config.cost_ratio_threshold
        })
        .count();
    debug!(high_cost, threshold = config.cost_ratio_threshold, "cost ratio check");
    let cost_warning = (high_cost > 0).then(|| {
        format!(
            "High cost-to-revenue ratio in {} records. Review cost control strategies.",
            format_int(high_cost as u64)
        )
    });

    // Zero new customers leaves the row out of the average.
    let cac: Vec<f64> = marketing
        .iter()
        .zip(&new_customers)
        .filter(|(_, n)| **n != 0.0)
        .map(|(m, n)| m / n)
        .collect();
    let avg_cac = mean_skip_nan(&cac);

    let margins: Vec<f64> = revenue
        .iter()
        .zip(&cogs)
        .map(|(r, c)| (r - c) / r * 100.0)
        .collect();
    let avg_margin = mean_skip_nan(&margins).unwrap_or(f64::NAN);

    let regions = sum_by(features, "region", "revenue")?;
    let (best_region, region_rev) =
        arg_extreme(&regions, Ordering::Greater).ok_or(DataIssue::NoRows)?;
    let products = sum_by(features, "product_name", "units_sold")?;
    let (best_product, units) =
        arg_extreme(&products, Ordering::Greater).ok_or(DataIssue::NoRows)?;

    let employee_profit = match pearson(&employees, &net_profit) {
        Some(r) if r < 0.0 => NEGATIVE_STAFFING,
        Some(r) if r > 0.0 => POSITIVE_STAFFING,
        _ => NO_STAFFING_RELATION,
    };

    let insights = InsightSet {
        top_month: format!(
            "Top-performing month: {} with revenue of {}",
            month_label(top_y, top_m),
            format_number(top_rev, 2)
        ),
        loss_month: format!(
            "Lowest-performing month: {} with revenue of {}",
            month_label(low_y, low_m),
            format_number(low_rev, 2)
        ),
        cost_warning,
        avg_cac: match avg_cac {
            Some(v) => format!("Average customer acquisition cost: {}", format_number(v, 2)),
            None => "Average customer acquisition cost: not available (no new customers recorded)"
                .to_string(),
        },
        avg_margin: format!("Average profit margin: {}", format_percent(avg_margin)),
        best_region: format!(
            "Top performing region: {} with total revenue of {}",
            best_region,
            format_number(region_rev, 2)
        ),
        best_product: format!(
            "Best-selling product: {} with {} units sold",
            best_product,
            format_units(units)
        ),
        employee_profit: employee_profit.to_string(),
    };
    info!(
        rows = features.len(),
        keys = insights.entries().len(),
        "generated insights"
    );
    Ok(insights)
}

/// Total revenue per region, ordered by region.
pub fn revenue_by_region(features: &FeatureTable) -> Result<Vec<(String, f64)>> {
    Ok(sum_by(features, "region", "revenue")?.into_iter().collect())
}

/// Products with the most units sold, best first.
pub fn top_products(features: &FeatureTable, n: usize) -> Result<Vec<(String, f64)>> {
    let mut rows: Vec<(String, f64)> = sum_by(features, "product_name", "units_sold")?
        .into_iter()
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    rows.truncate(n);
    Ok(rows)
}

pub fn kpis(features: &FeatureTable) -> Result<Kpis> {
    let revenue = required_numbers(features, "revenue")?;
    let net_profit = required_numbers(features, "net_profit")?;
    Ok(Kpis {
        total_revenue: revenue.iter().sum(),
        total_net_profit: net_profit.iter().sum(),
        avg_roi: features.roi.as_deref().and_then(mean_finite),
    })
}

fn required_numbers(features: &FeatureTable, name: &str) -> Result<Vec<f64>> {
    features
        .records
        .numbers(name)?
        .ok_or_else(|| AnalyticsError::MissingColumn {
            needed_by: "insight generation",
            missing: vec![name.to_string()],
        })
}

fn sum_by(features: &FeatureTable, key: &str, value: &str) -> Result<BTreeMap<String, f64>> {
    let keys = features
        .records
        .labels(key)
        .ok_or_else(|| AnalyticsError::MissingColumn {
            needed_by: "insight generation",
            missing: vec![key.to_string()],
        })?;
    let values = required_numbers(features, value)?;
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (k, v) in keys.into_iter().zip(values) {
        *totals.entry(k).or_insert(0.0) += v;
    }
    Ok(totals)
}

/// First key (in map order) holding the maximum or minimum total.
fn arg_extreme<K: Clone>(totals: &BTreeMap<K, f64>, want: Ordering) -> Option<(K, f64)> {
    let mut best: Option<(&K, f64)> = None;
    for (k, v) in totals {
        let replace = match best {
            None => true,
            Some((_, b)) => v.partial_cmp(&b) == Some(want),
        };
        if replace {
            best = Some((k, *v));
        }
    }
    best.map(|(k, v)| (k.clone(), v))
}

fn mean_skip_nan(v: &[f64]) -> Option<f64> {
    let kept: Vec<f64> = v.iter().copied().filter(|x| !x.is_nan()).collect();
    (!kept.is_empty()).then(|| average(&kept))
}

fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format_number(units, 0)
    } else {
        format_number(units, 2)
    }
}
