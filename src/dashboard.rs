//! One full recomputation of the dashboard from explicit inputs.

use serde::{Deserialize, Serialize};

use crate::chart::{build_charts, ChartSet, PieBasis, DEFAULT_DONUT_HOLE};
use crate::data::aggregate::{group_sum, GroupOrder, GroupedTable};
use crate::data::filter::{FilterSpec, FilteredView};
use crate::data::model::Dataset;
use crate::data::schema::GroupBy;
use crate::error::{EncodeError, Result};
use crate::export::{chart_artifact, filtered_artifact, table_artifact, ExportArtifact, DEFAULT_PLOTLY_CDN};

/// Which rows feed the grouped table and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AggregateSource {
    /// The whole upload, independent of the sidebar filters.
    #[default]
    Dataset,
    /// Only the rows that pass the filters.
    Filtered,
}

/// Knobs that are not part of the user's per-interaction input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub aggregate_source: AggregateSource,
    pub pie_basis: PieBasis,
    pub group_order: GroupOrder,
    pub donut_hole: f64,
    pub plotly_cdn: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            aggregate_source: AggregateSource::default(),
            pie_basis: PieBasis::default(),
            group_order: GroupOrder::default(),
            donut_hole: DEFAULT_DONUT_HOLE,
            plotly_cdn: DEFAULT_PLOTLY_CDN.to_string(),
        }
    }
}

/// Everything the page shows for one set of inputs.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub filtered: FilteredView<'a>,
    pub grouped: GroupedTable,
    pub charts: ChartSet,
}

/// Run filter → aggregate → chart projection.
///
/// Fails as a whole: no table or chart is returned when any stage fails.
pub fn render<'a>(
    dataset: &'a Dataset,
    filters: &FilterSpec,
    group_by: GroupBy,
    options: &DashboardOptions,
) -> Result<DashboardView<'a>> {
    let filtered = FilteredView::new(dataset, filters);
    let (grouped, charts) = summarize(&filtered, group_by, options)?;

    log::debug!(
        "Dashboard: {} visible rows, {} groups by {group_by}",
        filtered.len(),
        grouped.len()
    );
    Ok(DashboardView {
        filtered,
        grouped,
        charts,
    })
}

/// Aggregate and chart, given an already filtered view.
///
/// The view is only read when `options.aggregate_source` is
/// [`AggregateSource::Filtered`]; otherwise its whole dataset is used.
pub fn summarize(
    filtered: &FilteredView<'_>,
    group_by: GroupBy,
    options: &DashboardOptions,
) -> Result<(GroupedTable, ChartSet)> {
    match options.aggregate_source {
        AggregateSource::Dataset => {
            let dataset = filtered.dataset();
            let grouped = group_sum(dataset, group_by, options.group_order)?;
            let charts = build_charts(&grouped, dataset, options.pie_basis, options.donut_hole)?;
            Ok((grouped, charts))
        }
        AggregateSource::Filtered => {
            let grouped = group_sum(filtered, group_by, options.group_order)?;
            let charts = build_charts(&grouped, filtered, options.pie_basis, options.donut_hole)?;
            Ok((grouped, charts))
        }
    }
}

impl DashboardView<'_> {
    /// The grouped table followed by the bar, pie, line and donut charts.
    pub fn downloads(&self, options: &DashboardOptions) -> std::result::Result<Vec<ExportArtifact>, EncodeError> {
        let mut artifacts = vec![table_artifact(&self.grouped)?];
        for chart in self.charts.iter() {
            artifacts.push(chart_artifact(chart, &options.plotly_cdn)?);
        }
        Ok(artifacts)
    }

    /// The filtered rows as a workbook.
    pub fn filtered_download(&self) -> std::result::Result<ExportArtifact, EncodeError> {
        filtered_artifact(&self.filtered)
    }
}
