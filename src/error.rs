//! Error types for the dashboard pipeline.
//!
//! Every error is terminal for the recomputation that raised it: the caller
//! shows the message and keeps no partial output.

use thiserror::Error;

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// The uploaded file could not be turned into a dataset.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("uploaded file is empty")]
    EmptyInput,

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("first sheet has no header row")]
    MissingHeader,

    #[error("sheet has a header but no data rows")]
    NoRecords,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The grouping choice is not one of the known grouping columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidGroupingError {
    #[error("'{0}' is not a grouping column (expected one of Name, IP_Address, Switch IP, Status, AP_Type)")]
    Unknown(String),

    #[error("grouping column '{0}' is not present in the dataset")]
    Absent(&'static str),
}

/// `Total_AP` values that cannot be summed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("row {row}: Total_AP value '{value}' is not numeric")]
    NonNumeric { row: usize, value: String },

    #[error("Total_AP sum for group '{key}' is not finite")]
    Overflow { key: String },
}

/// Export serialization failures.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("cell at row {row}, column {column} cannot be written: {reason}")]
    UnsupportedCell {
        row: usize,
        column: usize,
        reason: String,
    },

    #[error("table has {0} columns, more than a worksheet holds")]
    TooManyColumns(usize),

    #[error("table has {0} rows, more than a worksheet holds")]
    TooManyRows(usize),

    #[error("chart '{0}' has no series data")]
    EmptySeries(String),

    #[error("chart '{title}' has {labels} labels but {values} values")]
    SeriesLengthMismatch {
        title: String,
        labels: usize,
        values: usize,
    },

    #[error("xlsx writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any failure of one dashboard recomputation.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    InvalidGrouping(#[from] InvalidGroupingError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
