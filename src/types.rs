use crate::error::{AnalyticsError, DataIssue, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

pub const PROFIT_MARGIN: &str = "Profit_Margin (%)";
pub const ROI: &str = "ROI (%)";
pub const REVENUE_GROWTH: &str = "Revenue_Growth (%)";
pub const PROFIT_GROWTH: &str = "Profit_Growth (%)";
pub const BEP: &str = "BEP";

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Ordered rows under a shared header. Every row is as wide as the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Rows shorter than the header are padded with `Missing`, longer rows
    /// are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cells(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Numeric view of a column. `Ok(None)` when the column is absent.
    pub fn numbers(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let Some(cells) = self.cells(name) else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(cells.len());
        let mut bad = Vec::new();
        for cell in cells {
            match cell.as_f64() {
                Some(v) => out.push(v),
                None => bad.push(cell),
            }
        }
        if let Some(first) = bad.first() {
            return Err(DataIssue::NonNumeric {
                column: name.to_string(),
                count: bad.len(),
                example: first.to_string(),
            }
            .into());
        }
        Ok(Some(out))
    }

    /// Display strings of a column, for grouping keys.
    pub fn labels(&self, name: &str) -> Option<Vec<String>> {
        self.cells(name)
            .map(|cells| cells.into_iter().map(|c| c.to_string()).collect())
    }

    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let cells = self.cells("date").ok_or_else(|| AnalyticsError::MissingColumn {
            needed_by: "date lookup",
            missing: vec!["date".to_string()],
        })?;
        let dates: Vec<NaiveDate> = cells.iter().filter_map(|c| c.as_date()).collect();
        if dates.len() != cells.len() {
            return Err(DataIssue::InvalidDates {
                count: cells.len() - dates.len(),
            }
            .into());
        }
        Ok(dates)
    }

    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }
}

/// Clean records plus the derived financial columns. A derived column is
/// `None` when its source columns were not available.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub records: Table,
    pub profit_margin: Option<Vec<f64>>,
    pub roi: Option<Vec<f64>>,
    pub revenue_growth: Option<Vec<Option<f64>>>,
    pub profit_growth: Option<Vec<Option<f64>>>,
    pub bep: Option<Vec<f64>>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of the derived columns that were computed, in output order.
    pub fn derived_columns(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.profit_margin.is_some() {
            names.push(PROFIT_MARGIN);
        }
        if self.roi.is_some() {
            names.push(ROI);
        }
        if self.revenue_growth.is_some() {
            names.push(REVENUE_GROWTH);
        }
        if self.profit_growth.is_some() {
            names.push(PROFIT_GROWTH);
        }
        if self.bep.is_some() {
            names.push(BEP);
        }
        names
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.records.columns().to_vec();
        names.extend(self.derived_columns().into_iter().map(String::from));
        names
    }

    /// Values of any numeric column, source or derived. Growth columns carry
    /// `None` on their first row.
    pub fn series(&self, name: &str) -> Result<Option<Vec<Option<f64>>>> {
        let dense = |v: &Vec<f64>| v.iter().copied().map(Some).collect::<Vec<_>>();
        Ok(match name {
            PROFIT_MARGIN => self.profit_margin.as_ref().map(dense),
            ROI => self.roi.as_ref().map(dense),
            BEP => self.bep.as_ref().map(dense),
            REVENUE_GROWTH => self.revenue_growth.clone(),
            PROFIT_GROWTH => self.profit_growth.clone(),
            _ => self
                .records
                .numbers(name)?
                .map(|v| v.into_iter().map(Some).collect()),
        })
    }

    /// Derived cells for one row, aligned with `derived_columns()`. Rows past
    /// the end come back as `Missing`.
    pub fn derived_cells(&self, row: usize) -> Vec<Cell> {
        let plain = |v: &Option<Vec<f64>>| {
            v.as_ref().map(|v| {
                v.get(row)
                    .copied()
                    .map(Cell::Number)
                    .unwrap_or(Cell::Missing)
            })
        };
        let optional = |v: &Option<Vec<Option<f64>>>| {
            v.as_ref().map(|v| {
                v.get(row)
                    .copied()
                    .flatten()
                    .map(Cell::Number)
                    .unwrap_or(Cell::Missing)
            })
        };
        [
            plain(&self.profit_margin),
            plain(&self.roi),
            optional(&self.revenue_growth),
            optional(&self.profit_growth),
            plain(&self.bep),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Keeps the listed rows. Derived values are sliced as computed, not
    /// recomputed over the subset.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureTable {
        fn pick<T: Clone>(v: &Option<Vec<T>>, indices: &[usize]) -> Option<Vec<T>> {
            v.as_ref()
                .map(|v| indices.iter().filter_map(|&i| v.get(i).cloned()).collect())
        }
        FeatureTable {
            records: self.records.select_rows(indices),
            profit_margin: pick(&self.profit_margin, indices),
            roi: pick(&self.roi, indices),
            revenue_growth: pick(&self.revenue_growth, indices),
            profit_growth: pick(&self.profit_growth, indices),
            bep: pick(&self.bep, indices),
        }
    }

    pub fn filter(&self, filter: &FeatureFilter) -> Result<FeatureTable> {
        let dates = match filter.date_range {
            Some(_) => Some(self.records.dates()?),
            None => None,
        };
        let revenue = match filter.revenue_range {
            Some(_) => Some(self.records.numbers("revenue")?.ok_or_else(|| {
                AnalyticsError::MissingColumn {
                    needed_by: "revenue filter",
                    missing: vec!["revenue".to_string()],
                }
            })?),
            None => None,
        };
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| {
                let date_ok = match (filter.date_range, &dates) {
                    (Some((from, to)), Some(d)) => d[i] >= from && d[i] <= to,
                    _ => true,
                };
                let revenue_ok = match (filter.revenue_range, &revenue) {
                    (Some((lo, hi)), Some(r)) => r[i] >= lo && r[i] <= hi,
                    _ => true,
                };
                date_ok && revenue_ok
            })
            .collect();
        Ok(self.select_rows(&keep))
    }
}

/// Inclusive row filter over an extracted table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureFilter {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub revenue_range: Option<(f64, f64)>,
}

/// Named textual observations. `cost_warning` is only set when at least one
/// row crossed the cost threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSet {
    pub top_month: String,
    pub loss_month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_warning: Option<String>,
    pub avg_cac: String,
    pub avg_margin: String,
    pub best_region: String,
    pub best_product: String,
    pub employee_profit: String,
}

impl InsightSet {
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = vec![
            ("top_month", self.top_month.as_str()),
            ("loss_month", self.loss_month.as_str()),
        ];
        if let Some(w) = &self.cost_warning {
            out.push(("cost_warning", w.as_str()));
        }
        out.extend([
            ("avg_cac", self.avg_cac.as_str()),
            ("avg_margin", self.avg_margin.as_str()),
            ("best_region", self.best_region.as_str()),
            ("best_product", self.best_product.as_str()),
            ("employee_profit", self.employee_profit.as_str()),
        ]);
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_net_profit: f64,
    pub avg_roi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTable {
    pub metric: String,
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lowest point forecast strictly after `after`.
    pub fn future_dip(&self, after: NaiveDate) -> Option<&ForecastRow> {
        self.rows
            .iter()
            .filter(|r| r.date > after)
            .min_by(|a, b| a.yhat.total_cmp(&b.yhat))
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct InsightRow {
    #[tabled(rename = "Insight")]
    pub key: String,
    #[tabled(rename = "Observation")]
    pub text: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "KPI")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ForecastPreviewRow {
    #[serde(rename = "ds")]
    #[tabled(rename = "Week")]
    pub date: String,
    #[serde(rename = "yhat")]
    #[tabled(rename = "Forecast")]
    pub yhat: String,
    #[serde(rename = "yhat_lower")]
    #[tabled(rename = "Lower")]
    pub yhat_lower: String,
    #[serde(rename = "yhat_upper")]
    #[tabled(rename = "Upper")]
    pub yhat_upper: String,
}
