//! Export encoders: tables to xlsx, charts to standalone HTML.
//!
//! Both produce an [`ExportArtifact`]; offering it to the user is up to the
//! caller.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::{json, Value};

use crate::chart::{ChartKind, ChartSpec, Template};
use crate::data::aggregate::GroupedTable;
use crate::data::filter::FilteredView;
use crate::data::loader::RawSheet;
use crate::data::model::{CellValue, Dataset, Record};
use crate::data::schema::Column;
use crate::error::EncodeError;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const HTML_MIME: &str = "text/html";
pub const TABLE_FILENAME: &str = "data_download.xlsx";
pub const FILTERED_FILENAME: &str = "filtered_download.xlsx";
pub const CHART_FILENAME: &str = "plot.html";
pub const DEFAULT_PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

// Worksheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;
// Largest integer an xlsx number (an f64) holds exactly.
const MAX_EXACT_INT: u64 = 1 << 53;

/// A named, typed byte buffer ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Tabular – anything with a header row and cell rows
// ---------------------------------------------------------------------------

/// A table that can be written to a worksheet.
pub trait Tabular {
    fn header(&self) -> Vec<String>;
    fn cell_rows(&self) -> Vec<Vec<CellValue>>;
}

impl Tabular for GroupedTable {
    fn header(&self) -> Vec<String> {
        vec![
            self.group_by.header().to_string(),
            Column::TotalAp.header().to_string(),
        ]
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|r| vec![CellValue::Text(r.key.clone()), CellValue::Float(r.total)])
            .collect()
    }
}

fn record_cells(record: &Record, columns: &[Column]) -> Vec<CellValue> {
    columns
        .iter()
        .map(|&col| match record.text(col) {
            Some(text) => CellValue::Text(text.to_string()),
            None => record.total_ap.clone(),
        })
        .collect()
}

fn column_headers(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.header().to_string()).collect()
}

impl Tabular for Dataset {
    fn header(&self) -> Vec<String> {
        column_headers(&self.columns)
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        self.records
            .iter()
            .map(|r| record_cells(r, &self.columns))
            .collect()
    }
}

impl Tabular for FilteredView<'_> {
    fn header(&self) -> Vec<String> {
        column_headers(&self.dataset().columns)
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        let columns = &self.dataset().columns;
        self.records().map(|r| record_cells(r, columns)).collect()
    }
}

impl Tabular for RawSheet {
    fn header(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows.clone()
    }
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &CellValue,
) -> Result<(), EncodeError> {
    let unsupported = |reason: &str| EncodeError::UnsupportedCell {
        row,
        column: col,
        reason: reason.to_string(),
    };
    let (r, c) = (row as u32, col as u16);
    match value {
        CellValue::Text(s) => {
            worksheet.write_string(r, c, s)?;
        }
        CellValue::Integer(i) => {
            if i.unsigned_abs() > MAX_EXACT_INT {
                return Err(unsupported("integer too large for an exact xlsx number"));
            }
            worksheet.write_number(r, c, *i as f64)?;
        }
        CellValue::Float(f) => {
            if !f.is_finite() {
                return Err(unsupported("non-finite number"));
            }
            worksheet.write_number(r, c, *f)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(r, c, *b)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

/// Encode a table as an xlsx workbook: header row, then one row per entry.
pub fn encode_xlsx<T: Tabular + ?Sized>(table: &T) -> Result<Vec<u8>, EncodeError> {
    let header = table.header();
    let rows = table.cell_rows();
    if header.len() > MAX_COLS {
        return Err(EncodeError::TooManyColumns(header.len()));
    }
    if rows.len() + 1 > MAX_ROWS {
        return Err(EncodeError::TooManyRows(rows.len()));
    }

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    let bold = Format::new().set_bold();

    for (c, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, name, &bold)?;
    }
    for (r, cells) in rows.iter().enumerate() {
        if cells.len() > MAX_COLS {
            return Err(EncodeError::TooManyColumns(cells.len()));
        }
        for (c, value) in cells.iter().enumerate() {
            write_cell(&mut worksheet, r + 1, c, value)?;
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;
    log::debug!("Encoded {} rows into {} xlsx bytes", rows.len(), buffer.len());
    Ok(buffer)
}

/// The "updated table" download.
pub fn table_artifact<T: Tabular + ?Sized>(table: &T) -> Result<ExportArtifact, EncodeError> {
    Ok(ExportArtifact {
        filename: TABLE_FILENAME.to_string(),
        mime: XLSX_MIME,
        bytes: encode_xlsx(table)?,
    })
}

/// The filtered rows as a workbook.
pub fn filtered_artifact(view: &FilteredView<'_>) -> Result<ExportArtifact, EncodeError> {
    Ok(ExportArtifact {
        filename: FILTERED_FILENAME.to_string(),
        mime: XLSX_MIME,
        bytes: encode_xlsx(view)?,
    })
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn validate(chart: &ChartSpec) -> Result<(), EncodeError> {
    if chart.labels.len() != chart.values.len() {
        return Err(EncodeError::SeriesLengthMismatch {
            title: chart.title.clone(),
            labels: chart.labels.len(),
            values: chart.values.len(),
        });
    }
    if chart.labels.is_empty() {
        return Err(EncodeError::EmptySeries(chart.title.clone()));
    }
    Ok(())
}

fn template_layout(template: Template) -> Value {
    match template {
        Template::Light => json!({
            "paper_bgcolor": "white",
            "plot_bgcolor": "white",
            "font": { "color": "#2a3f5f" },
            "xaxis": { "gridcolor": "#EBF0F8", "zerolinecolor": "#EBF0F8" },
            "yaxis": { "gridcolor": "#EBF0F8", "zerolinecolor": "#EBF0F8" },
        }),
        Template::Dark => json!({
            "paper_bgcolor": "rgb(17,17,17)",
            "plot_bgcolor": "rgb(17,17,17)",
            "font": { "color": "#f2f5fa" },
            "xaxis": { "gridcolor": "#283442", "zerolinecolor": "#283442" },
            "yaxis": { "gridcolor": "#283442", "zerolinecolor": "#283442" },
        }),
    }
}

/// Plotly figure (`data` + `layout`) for a chart.
pub fn figure_json(chart: &ChartSpec) -> Result<Value, EncodeError> {
    validate(chart)?;

    let trace = match chart.kind {
        ChartKind::Bar => json!({
            "type": "bar",
            "x": chart.labels,
            "y": chart.values,
        }),
        ChartKind::Line => json!({
            "type": "scatter",
            "mode": "lines",
            "x": chart.labels,
            "y": chart.values,
        }),
        ChartKind::Pie | ChartKind::Donut => json!({
            "type": "pie",
            "labels": chart.labels,
            "values": chart.values,
            "hole": chart.hole.unwrap_or(0.0),
        }),
    };

    let mut layout = template_layout(chart.template);
    layout["title"] = json!({ "text": format!("<b>{}</b>", chart.title) });
    if !chart.kind.is_circular() {
        layout["xaxis"]["title"] = json!({ "text": chart.group_by.header() });
        layout["yaxis"]["title"] = json!({ "text": Column::TotalAp.header() });
    }

    Ok(json!({ "data": [trace], "layout": layout }))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a chart as a standalone HTML page that pulls plotly.js from `cdn_url`.
pub fn encode_html(chart: &ChartSpec, cdn_url: &str) -> Result<Vec<u8>, EncodeError> {
    let figure = figure_json(chart)?;
    // Keep "</script>" inside string values from closing the script element.
    let data = serde_json::to_string(&figure["data"])?.replace("</", "<\\/");
    let layout = serde_json::to_string(&figure["layout"])?.replace("</", "<\\/");
    let div_id = format!("chart-{:?}", chart.kind).to_lowercase();

    let html = format!(
        r#"<html>
<head><meta charset="utf-8" /><title>{title}</title></head>
<body>
    <div id="{div_id}" class="plotly-graph-div" style="height:100%; width:100%;"></div>
    <script src="{cdn}" charset="utf-8"></script>
    <script type="text/javascript">
        Plotly.newPlot("{div_id}", {data}, {layout}, {{"responsive": true}});
    </script>
</body>
</html>
"#,
        title = escape_html(&chart.title),
        cdn = escape_html(cdn_url),
    );
    Ok(html.into_bytes())
}

/// A chart download.
pub fn chart_artifact(chart: &ChartSpec, cdn_url: &str) -> Result<ExportArtifact, EncodeError> {
    Ok(ExportArtifact {
        filename: CHART_FILENAME.to_string(),
        mime: HTML_MIME,
        bytes: encode_html(chart, cdn_url)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::project;
    use crate::data::aggregate::{group_sum, GroupOrder};
    use crate::data::filter::{FilterMode, FilterSpec};
    use crate::data::loader::{parse_bytes, read_sheet, FileFormat};
    use crate::data::model::tests::sample_dataset;
    use crate::data::schema::{FilterColumn, GroupBy};

    fn status_table() -> GroupedTable {
        group_sum(&sample_dataset(), GroupBy::Status, GroupOrder::FirstSeen).unwrap()
    }

    #[test]
    fn grouped_table_round_trips_through_xlsx() {
        let table = status_table();
        let bytes = encode_xlsx(&table).unwrap();
        let sheet = read_sheet(&bytes).unwrap();

        assert_eq!(sheet.headers, ["Status", "Total_AP"]);
        let back: Vec<(String, f64)> = sheet
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r[0].to_text(), r[1].as_total(i + 2).unwrap()))
            .collect();
        assert_eq!(back, [("up".to_string(), 3.0), ("down".to_string(), 5.0)]);
    }

    #[test]
    fn dataset_round_trips_through_the_parser() {
        let ds = sample_dataset();
        let bytes = encode_xlsx(&ds).unwrap();
        let parsed = parse_bytes(&bytes, FileFormat::Workbook).unwrap();
        assert_eq!(parsed.columns, ds.columns);
        for (a, b) in parsed.records.iter().zip(&ds.records) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.status, b.status);
            assert_eq!(a.total_ap.as_total(0), b.total_ap.as_total(0));
        }
    }

    #[test]
    fn filtered_view_exports_only_selected_rows() {
        let ds = sample_dataset();
        let mut spec = FilterSpec::all_selected(&ds).with_mode(FilterMode::All);
        spec.select(FilterColumn::Name, ["B"]);
        let view = FilteredView::new(&ds, &spec);
        let artifact = filtered_artifact(&view).unwrap();
        let sheet = read_sheet(&artifact.bytes).unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][0], CellValue::Text("B".into()));
    }

    #[test]
    fn unsupported_cells_fail() {
        let sheet = RawSheet {
            headers: vec!["x".into()],
            rows: vec![vec![CellValue::Float(f64::NAN)]],
        };
        assert!(matches!(
            encode_xlsx(&sheet),
            Err(EncodeError::UnsupportedCell { row: 1, column: 0, .. })
        ));

        let sheet = RawSheet {
            headers: vec!["x".into()],
            rows: vec![vec![CellValue::Integer(i64::MAX)]],
        };
        assert!(encode_xlsx(&sheet).is_err());
    }

    #[test]
    fn table_artifact_metadata() {
        let artifact = table_artifact(&status_table()).unwrap();
        assert_eq!(artifact.filename, "data_download.xlsx");
        assert_eq!(artifact.mime, XLSX_MIME);
        // xlsx is a zip container.
        assert!(artifact.bytes.starts_with(b"PK"));
    }

    #[test]
    fn html_references_the_cdn_runtime() {
        let chart = project(&status_table(), ChartKind::Bar);
        let artifact = chart_artifact(&chart, DEFAULT_PLOTLY_CDN).unwrap();
        assert_eq!(artifact.filename, "plot.html");
        assert_eq!(artifact.mime, "text/html");

        let html = String::from_utf8(artifact.bytes).unwrap();
        assert!(html.contains(r#"<script src="https://cdn.plot.ly/plotly-2.35.2.min.js""#));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains(r#""x":["up","down"]"#));
        assert!(html.contains("<title>Network Bar Chart by Status</title>"));
    }

    #[test]
    fn fractional_totals_are_written_exactly() {
        let mut ds = sample_dataset();
        ds.records[0].total_ap = CellValue::Float(2.5);
        let table = group_sum(&ds, GroupBy::Name, GroupOrder::FirstSeen).unwrap();
        let sheet = read_sheet(&encode_xlsx(&table).unwrap()).unwrap();
        assert_eq!(sheet.rows[0][1], CellValue::Float(2.5));
    }

    #[test]
    fn axis_title_comes_from_the_grouping_column() {
        let mut chart = project(&status_table(), ChartKind::Line);
        chart.title = "Uplinks".into();
        let fig = figure_json(&chart).unwrap();
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "Status");
        assert_eq!(fig["layout"]["yaxis"]["title"]["text"], "Total_AP");
    }

    #[test]
    fn donut_figure_carries_the_hole() {
        let chart = project(&status_table(), ChartKind::Donut);
        let fig = figure_json(&chart).unwrap();
        assert_eq!(fig["data"][0]["type"], "pie");
        assert_eq!(fig["data"][0]["hole"], 0.3);
        assert_eq!(fig["layout"]["paper_bgcolor"], "rgb(17,17,17)");
    }

    #[test]
    fn labels_cannot_break_out_of_the_script() {
        let mut chart = project(&status_table(), ChartKind::Line);
        chart.labels[0] = "</script><b>".into();
        let html = String::from_utf8(encode_html(&chart, DEFAULT_PLOTLY_CDN).unwrap()).unwrap();
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn malformed_charts_fail() {
        let mut chart = project(&status_table(), ChartKind::Pie);
        chart.values.pop();
        assert!(matches!(
            encode_html(&chart, DEFAULT_PLOTLY_CDN),
            Err(EncodeError::SeriesLengthMismatch { labels: 2, values: 1, .. })
        ));

        chart.labels.clear();
        chart.values.clear();
        assert!(matches!(
            encode_html(&chart, DEFAULT_PLOTLY_CDN),
            Err(EncodeError::EmptySeries(_))
        ));
    }
}
