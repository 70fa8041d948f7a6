use crate::error::{AnalyticsError, DataIssue, Result};
use crate::types::{Cell, Table};
use crate::util::{parse_date_safe, parse_f64_safe};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every uploaded dataset must carry, after name normalization.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "date",
    "revenue",
    "net_profit",
    "cogs",
    "operating_expense",
    "marketing_cost",
    "investment_cost",
    "total_customers",
    "orders",
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub dropped_incomplete: usize,
    pub filtered_rows: usize,
    /// Optional columns that held non-numeric values and were kept as text.
    pub text_columns: Vec<String>,
}

/// Read a CSV file into a raw table. Every field is `Text` or `Missing`;
/// header names are kept exactly as written.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv_from(file)
}

pub fn read_csv_from<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() {
                        Cell::Missing
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    debug!(columns = columns.len(), rows = rows.len(), "read raw csv");
    Ok(Table::new(columns, rows))
}

/// Header-only CSV listing the required columns.
pub fn template_csv() -> String {
    format!("{}\n", REQUIRED_COLUMNS.join(","))
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

pub fn validate(raw: &Table) -> Result<Table> {
    validate_with_report(raw).map(|(table, _)| table)
}

/// Normalize, check the schema, parse dates, drop incomplete rows and type
/// the remaining cells.
pub fn validate_with_report(raw: &Table) -> Result<(Table, LoadReport)> {
    let supplied = raw.columns().to_vec();

    let mut seen = HashSet::new();
    let mut keep_cols: Vec<usize> = Vec::new();
    let mut columns: Vec<String> = Vec::new();
    for (idx, name) in supplied.iter().enumerate() {
        let norm = normalize_column_name(name);
        if seen.insert(norm.clone()) {
            keep_cols.push(idx);
            columns.push(norm);
        } else {
            warn!(column = %name, "duplicate column after normalization, keeping the first");
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalyticsError::Schema { missing, supplied });
    }

    let date_idx = columns.iter().position(|c| c == "date").unwrap_or(0);
    let total_rows = raw.len();
    let mut invalid_dates = 0usize;
    let mut dropped_incomplete = 0usize;
    let mut prelim: Vec<Vec<Cell>> = Vec::new();

    for raw_row in raw.rows() {
        let mut row: Vec<Cell> = keep_cols.iter().map(|&i| raw_row[i].clone()).collect();

        let date = match &row[date_idx] {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date_safe(Some(s)),
            _ => None,
        };
        let Some(date) = date else {
            invalid_dates += 1;
            continue;
        };
        row[date_idx] = Cell::Date(date);

        if row.iter().any(Cell::is_missing) {
            dropped_incomplete += 1;
            continue;
        }
        prelim.push(row);
    }

    if prelim.is_empty() {
        return Err(DataIssue::EmptyAfterCleaning { invalid_dates }.into());
    }
    if invalid_dates > 0 {
        return Err(DataIssue::InvalidDates {
            count: invalid_dates,
        }
        .into());
    }
    if dropped_incomplete > 0 {
        warn!(rows = dropped_incomplete, "dropped rows with missing values");
    }

    let mut text_columns = Vec::new();
    for (col, name) in columns.iter().enumerate() {
        if col == date_idx {
            continue;
        }
        let parsed: Vec<Option<f64>> = prelim.iter().map(|r| numeric_value(&r[col])).collect();
        let bad = parsed.iter().filter(|v| v.is_none()).count();
        if bad == 0 {
            for (row, v) in prelim.iter_mut().zip(parsed) {
                if let Some(v) = v {
                    row[col] = Cell::Number(v);
                }
            }
        } else if REQUIRED_COLUMNS.contains(&name.as_str()) {
            let example = prelim
                .iter()
                .map(|r| &r[col])
                .find(|c| numeric_value(c).is_none())
                .map(|c| c.to_string())
                .unwrap_or_default();
            return Err(DataIssue::NonNumeric {
                column: name.clone(),
                count: bad,
                example,
            }
            .into());
        } else {
            for row in prelim.iter_mut() {
                if !matches!(row[col], Cell::Text(_)) {
                    row[col] = Cell::Text(row[col].to_string());
                }
            }
            text_columns.push(name.clone());
        }
    }

    let filtered_rows = prelim.len();
    info!(total_rows, filtered_rows, dropped_incomplete, "validated dataset");
    let report = LoadReport {
        total_rows,
        dropped_incomplete,
        filtered_rows,
        text_columns,
    };
    Ok((Table::new(columns, prelim), report))
}

fn numeric_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}
