//! Chart projection: grouped tables → rendering-agnostic chart specs.

use serde::{Deserialize, Serialize};

use crate::data::aggregate::{require_column, GroupedTable};
use crate::data::model::RecordSource;
use crate::data::schema::GroupBy;
use crate::error::DashboardError;

/// Hole fraction of the donut chart.
pub const DEFAULT_DONUT_HOLE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Donut,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [ChartKind::Bar, ChartKind::Pie, ChartKind::Line, ChartKind::Donut];

    /// Download caption.
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Donut => "Donut-Like Pie Chart",
        }
    }

    pub fn is_circular(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Donut)
    }
}

/// Visual template. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Template {
    #[default]
    Light,
    Dark,
}

/// What the pie chart is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PieBasis {
    /// One slice per group of the grouped table, like the other charts.
    #[default]
    Grouped,
    /// One entry per source row with that row's own `Total_AP`; the renderer
    /// merges repeated labels.
    RawRows,
}

/// A chart's data and style, independent of any charting library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Column the labels come from; names the category axis.
    pub group_by: GroupBy,
    /// Category axis (bar/line) or slice names (pie/donut).
    pub labels: Vec<String>,
    /// Parallel to `labels`.
    pub values: Vec<f64>,
    pub template: Template,
    /// Only set for donuts.
    pub hole: Option<f64>,
}

fn title(kind: ChartKind, group_by: GroupBy) -> String {
    match kind {
        ChartKind::Bar => format!("Network Bar Chart by {group_by}"),
        ChartKind::Pie => "AP Pie Chart".to_string(),
        ChartKind::Line => format!("Network Line Chart by {group_by}"),
        ChartKind::Donut => format!("Network Donut-Like Pie Chart by {group_by}"),
    }
}

fn template(kind: ChartKind) -> Template {
    match kind {
        ChartKind::Bar => Template::Light,
        _ => Template::Dark,
    }
}

/// Project a grouped table into a chart: labels are the group keys, values the sums.
pub fn project(table: &GroupedTable, kind: ChartKind) -> ChartSpec {
    ChartSpec {
        kind,
        title: title(kind, table.group_by),
        group_by: table.group_by,
        labels: table.keys(),
        values: table.totals(),
        template: template(kind),
        hole: (kind == ChartKind::Donut).then_some(DEFAULT_DONUT_HOLE),
    }
}

/// Build the pie chart straight from source rows, one entry per row.
pub fn pie_from_rows<S: RecordSource + ?Sized>(
    source: &S,
    group_by: GroupBy,
) -> Result<ChartSpec, DashboardError> {
    require_column(source, group_by)?;
    let column = group_by.column();

    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (index, record) in source.rows() {
        values.push(record.total_ap.as_total(index + 2)?);
        labels.push(record.text(column).unwrap_or_default().to_string());
    }

    Ok(ChartSpec {
        kind: ChartKind::Pie,
        title: title(ChartKind::Pie, group_by),
        group_by,
        labels,
        values,
        template: template(ChartKind::Pie),
        hole: None,
    })
}

/// The four dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub bar: ChartSpec,
    pub pie: ChartSpec,
    pub line: ChartSpec,
    pub donut: ChartSpec,
}

impl ChartSet {
    pub fn get(&self, kind: ChartKind) -> &ChartSpec {
        match kind {
            ChartKind::Bar => &self.bar,
            ChartKind::Pie => &self.pie,
            ChartKind::Line => &self.line,
            ChartKind::Donut => &self.donut,
        }
    }

    /// Charts in display order: bar, pie, line, donut.
    pub fn iter(&self) -> impl Iterator<Item = &ChartSpec> {
        ChartKind::ALL.into_iter().map(move |k| self.get(k))
    }
}

/// Build all four charts.
///
/// `pie_source` is only read when `pie_basis` is [`PieBasis::RawRows`].
pub fn build_charts<S: RecordSource + ?Sized>(
    table: &GroupedTable,
    pie_source: &S,
    pie_basis: PieBasis,
    donut_hole: f64,
) -> Result<ChartSet, DashboardError> {
    let pie = match pie_basis {
        PieBasis::Grouped => project(table, ChartKind::Pie),
        PieBasis::RawRows => pie_from_rows(pie_source, table.group_by)?,
    };
    let mut donut = project(table, ChartKind::Donut);
    donut.hole = Some(donut_hole);

    Ok(ChartSet {
        bar: project(table, ChartKind::Bar),
        pie,
        line: project(table, ChartKind::Line),
        donut,
    })
}
