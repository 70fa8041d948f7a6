use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error(
        "Your dataset is missing these required columns: {}\nUploaded columns: {}\nRequired columns: {}",
        .missing.join(", "),
        .supplied.join(", "),
        crate::loader::REQUIRED_COLUMNS.join(", ")
    )]
    Schema {
        missing: Vec<String>,
        supplied: Vec<String>,
    },

    #[error(transparent)]
    Data(#[from] DataIssue),

    #[error("{needed_by} needs columns that are not present: {}", .missing.join(", "))]
    MissingColumn {
        needed_by: &'static str,
        missing: Vec<String>,
    },

    #[error("Forecast error: {0}")]
    Forecast(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    /// True for errors the user fixes by editing their file.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Schema { .. }
                | AnalyticsError::Data(_)
                | AnalyticsError::MissingColumn { .. }
        )
    }
}

/// Problems with the values of an otherwise well-formed table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataIssue {
    #[error("Found {count} invalid date format(s). Dates must be in YYYY-MM-DD format.")]
    InvalidDates { count: usize },

    #[error(
        "No valid data remaining after cleaning ({invalid_dates} row(s) with invalid dates). Please check for missing values in required columns."
    )]
    EmptyAfterCleaning { invalid_dates: usize },

    #[error("Column '{column}' has {count} non-numeric value(s), e.g. '{example}'.")]
    NonNumeric {
        column: String,
        count: usize,
        example: String,
    },

    #[error("There are no rows to analyze.")]
    NoRows,
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_message_lists_missing_and_supplied() {
        let err = AnalyticsError::Schema {
            missing: vec!["cogs".to_string()],
            supplied: vec!["Date".to_string(), "Revenue".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing these required columns: cogs"));
        assert!(msg.contains("Uploaded columns: Date, Revenue"));
        assert!(msg.contains("Required columns: date, revenue, net_profit"));
        assert!(err.is_input_error());
    }

    #[test]
    fn data_issue_converts_into_error() {
        let err: AnalyticsError = DataIssue::InvalidDates { count: 3 }.into();
        assert_eq!(
            err.to_string(),
            "Found 3 invalid date format(s). Dates must be in YYYY-MM-DD format."
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn forecast_error_is_not_an_input_error() {
        let err = AnalyticsError::Forecast("too short".to_string());
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "Forecast error: too short");
    }
}
