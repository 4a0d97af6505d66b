use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::model::{CellValue, Dataset, Record};
use super::schema::Column;
use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Upload container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Any workbook calamine recognises (xlsx, xlsm, xlsb, xls, ods).
    Workbook,
    Csv,
}

impl FileFormat {
    /// Pick a format from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self, ParseError> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(FileFormat::Workbook),
            "csv" => Ok(FileFormat::Csv),
            other => Err(ParseError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Load an inventory dataset from a file.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Dataset, ParseError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = FileFormat::from_extension(ext)?;
    let bytes = std::fs::read(path)?;
    let dataset = parse_bytes(&bytes, format)?;
    log::info!(
        "Loaded {} records from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.columns
    );
    Ok(dataset)
}

/// Parse an uploaded byte stream into a dataset.
pub fn parse_bytes(bytes: &[u8], format: FileFormat) -> Result<Dataset, ParseError> {
    let sheet = match format {
        FileFormat::Workbook => read_sheet(bytes)?,
        FileFormat::Csv => read_csv(bytes)?,
    };
    dataset_from_sheet(sheet)
}

// ---------------------------------------------------------------------------
// RawSheet – header + untyped rows
// ---------------------------------------------------------------------------

/// The first worksheet of an upload: header names and raw cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// Cell at `row`/`col`, treating short rows as padded with empties.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }
}

// ---------------------------------------------------------------------------
// Workbook reader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an in-memory workbook.
///
/// The first row is the header. Rows whose cells are all blank are dropped
/// wherever they occur.
pub fn read_sheet(bytes: &[u8]) -> Result<RawSheet, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    log::debug!(
        "Reading sheet '{sheet_name}' ({} x {})",
        range.height(),
        range.width()
    );

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(ParseError::MissingHeader)?
        .iter()
        .map(|c| data_to_cell(c).to_text())
        .collect();

    let rows = rows
        .map(|r| r.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|r| !r.iter().all(CellValue::is_blank))
        .collect();

    Ok(RawSheet { headers, rows })
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(d) => CellValue::Float(d.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
        Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Every field is read as text; fields are not trimmed.
pub fn read_csv(bytes: &[u8]) -> Result<RawSheet, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

/// Validate the header once and convert rows into typed records.
pub fn dataset_from_sheet(sheet: RawSheet) -> Result<Dataset, ParseError> {
    let mut index: BTreeMap<Column, usize> = BTreeMap::new();
    let mut columns = Vec::new();
    for (i, header) in sheet.headers.iter().enumerate() {
        if let Some(col) = Column::from_header(header) {
            if !index.contains_key(&col) {
                index.insert(col, i);
                columns.push(col);
            }
        }
    }

    for col in Column::REQUIRED {
        if !index.contains_key(&col) {
            return Err(ParseError::MissingColumn(col.header().to_string()));
        }
    }

    if sheet.rows.is_empty() {
        return Err(ParseError::NoRecords);
    }

    let text = |row: usize, col: Column| -> String {
        index
            .get(&col)
            .map(|&c| sheet.cell(row, c).to_text())
            .unwrap_or_default()
    };

    let records = (0..sheet.rows.len())
        .map(|row| Record {
            name: text(row, Column::Name),
            ap_type: text(row, Column::ApType),
            ip_address: text(row, Column::IpAddress),
            status: text(row, Column::Status),
            switch_ip: text(row, Column::SwitchIp),
            total_ap: sheet.cell(row, index[&Column::TotalAp]).clone().coerce_numeric(),
        })
        .collect();

    Ok(Dataset::from_records(records, columns))
}
