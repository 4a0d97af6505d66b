use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{Column, FilterColumn};
use crate::error::AggregationError;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a worksheet.
/// Kept `Ord` + `Hash` so it can be used in sets and as a map key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Empty => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Empty, Empty) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Empty => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if is_whole(*v) => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

fn is_whole(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64
}

impl CellValue {
    /// Render the cell for a string column. Whole floats lose their `.0`,
    /// so a numeric `3.0` name becomes `"3"`.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Coerce a cell of a numeric column: numeric text becomes a number,
    /// anything else is kept as-is for the aggregator to reject.
    pub fn coerce_numeric(self) -> CellValue {
        match self {
            CellValue::Text(s) => {
                if s.is_empty() {
                    CellValue::Empty
                } else if let Ok(i) = s.parse::<i64>() {
                    CellValue::Integer(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    CellValue::Float(f)
                } else {
                    CellValue::Text(s)
                }
            }
            other => other,
        }
    }

    /// Whether the cell holds nothing, counting empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Interpret the cell as a `Total_AP` amount.
    ///
    /// `row` is the 1-based sheet row, used only for the error message.
    /// Empty cells count as zero; fractional amounts are kept as-is.
    pub fn as_total(&self, row: usize) -> Result<f64, AggregationError> {
        match self {
            CellValue::Integer(i) => Ok(*i as f64),
            CellValue::Float(v) if v.is_finite() => Ok(*v),
            CellValue::Empty => Ok(0.0),
            other => Err(AggregationError::NonNumeric {
                row,
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one access-point row
// ---------------------------------------------------------------------------

/// One row of the inventory sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub ap_type: String,
    pub ip_address: String,
    pub status: String,
    /// Empty when the sheet has no `Switch IP` column.
    pub switch_ip: String,
    /// Raw, numerically coerced `Total_AP` cell.
    pub total_ap: CellValue,
}

impl Record {
    /// Typed accessor for the string columns. `None` for `Total_AP`.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Name => Some(&self.name),
            Column::ApType => Some(&self.ap_type),
            Column::IpAddress => Some(&self.ip_address),
            Column::Status => Some(&self.status),
            Column::SwitchIp => Some(&self.switch_ip),
            Column::TotalAp => None,
        }
    }

    pub fn filter_value(&self, column: FilterColumn) -> &str {
        match column {
            FilterColumn::Name => &self.name,
            FilterColumn::ApType => &self.ap_type,
            FilterColumn::IpAddress => &self.ip_address,
            FilterColumn::Status => &self.status,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordSource – anything the aggregator can walk
// ---------------------------------------------------------------------------

/// A dataset-like sequence of records: the full [`Dataset`] or a filtered view.
pub trait RecordSource {
    /// Columns present in the underlying sheet.
    fn columns(&self) -> &[Column];

    /// Records paired with their index in the underlying dataset.
    fn rows(&self) -> impl Iterator<Item = (usize, &Record)>;

    fn has_column(&self, column: Column) -> bool {
        self.columns().contains(&column)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete uploaded sheet
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter options.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All records (rows), in sheet order.
    pub records: Vec<Record>,
    /// Known columns present in the sheet, in sheet order.
    pub columns: Vec<Column>,
    /// For each filterable column the distinct values in first-occurrence order.
    pub unique_values: BTreeMap<FilterColumn, Vec<String>>,
}

impl Dataset {
    /// Build the filter option lists from the records.
    pub fn from_records(records: Vec<Record>, columns: Vec<Column>) -> Self {
        let mut unique_values = BTreeMap::new();
        for col in FilterColumn::ALL {
            let mut seen = HashSet::new();
            let values: Vec<String> = records
                .iter()
                .map(|r| r.filter_value(col))
                .filter(|v| seen.insert(*v))
                .map(str::to_string)
                .collect();
            unique_values.insert(col, values);
        }
        Dataset {
            records,
            columns,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a filterable column (the multi-select options).
    pub fn options(&self, column: FilterColumn) -> &[String] {
        self.unique_values
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl RecordSource for Dataset {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.records.iter().enumerate()
    }
}
