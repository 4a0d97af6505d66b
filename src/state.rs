use network_dashboard::{
    summarize, ChartSet, Dataset, DashboardOptions, FilterColumn, FilterSpec, FilteredView,
    GroupBy, GroupedTable,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Per-column filter selections.
    pub filters: FilterSpec,

    /// "What would you like to analyse?"
    pub group_by: GroupBy,

    pub options: DashboardOptions,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Grouped table and charts; `None` when the last recomputation failed.
    pub grouped: Option<GroupedTable>,
    pub charts: Option<ChartSet>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterSpec::default(),
            group_by: GroupBy::default(),
            options: DashboardOptions::default(),
            visible_indices: Vec::new(),
            grouped: None,
            charts: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset, reset filters and recompute.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterSpec::all_selected(&dataset).with_mode(self.filters.mode);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Rerun filter → aggregate → charts. On failure nothing stale is kept.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let filtered = FilteredView::new(ds, &self.filters);
        let result = summarize(&filtered, self.group_by, &self.options);
        // The filtered rows stay visible even when aggregation fails.
        self.visible_indices = filtered.into_indices();
        match result {
            Ok((grouped, charts)) => {
                self.grouped = Some(grouped);
                self.charts = Some(charts);
                self.status_message = None;
            }
            Err(e) => {
                self.grouped = None;
                self.charts = None;
                self.report_error("Recomputation failed", e);
            }
        }
    }

    pub fn set_group_by(&mut self, group_by: GroupBy) {
        if self.group_by != group_by {
            self.group_by = group_by;
            self.recompute();
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &str) {
        let selected = self.filters.selections.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.recompute();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        if let Some(ds) = &self.dataset {
            let all = ds.options(column).to_vec();
            self.filters.select(column, all);
            self.recompute();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.filters.select(column, Vec::<String>::new());
        self.recompute();
    }

    /// Surface a failure in the status line.
    pub fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        log::error!("{context}: {error}");
        self.status_message = Some(format!("Error: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use network_dashboard::{CellValue, Column, Record};

    fn record(name: &str, total: CellValue) -> Record {
        Record {
            name: name.into(),
            ap_type: "indoor".into(),
            ip_address: format!("10.0.0.{}", name.len()),
            status: "up".into(),
            switch_ip: String::new(),
            total_ap: total,
        }
    }

    #[test]
    fn failed_aggregation_keeps_the_filtered_rows() {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(
            vec![
                record("A", CellValue::Integer(3)),
                record("BB", CellValue::Text("N/A".into())),
            ],
            Column::REQUIRED.to_vec(),
        ));

        assert_eq!(state.visible_indices, [0, 1]);
        assert!(state.grouped.is_none());
        assert!(state.charts.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn successful_recompute_clears_the_error() {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_records(
            vec![record("A", CellValue::Float(2.5)), record("BB", CellValue::Integer(1))],
            Column::REQUIRED.to_vec(),
        ));
        assert_eq!(state.grouped.as_ref().map(|g| g.grand_total()), Some(3.5));
        assert!(state.status_message.is_none());

        state.select_none(FilterColumn::Name);
        assert_eq!(state.visible_indices, [0, 1], "other columns still accept every row");
    }
}
