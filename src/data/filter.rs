use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::model::{Dataset, Record, RecordSource};
use super::schema::{Column, FilterColumn};

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per column
// ---------------------------------------------------------------------------

/// How the four column predicates combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// A row passes when it matches *any* column's accepted set.
    ///
    /// A column left at its default (everything accepted) matches every row,
    /// so narrowing a single column while the others stay at default shows
    /// all rows.
    #[default]
    Any,
    /// A row passes only when it matches *every* column's accepted set.
    All,
}

/// Per-column accepted values plus the combination rule.
///
/// A column absent from `selections` counts as "everything accepted".
/// A column present with an empty set accepts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub selections: BTreeMap<FilterColumn, BTreeSet<String>>,
    pub mode: FilterMode,
}

impl FilterSpec {
    /// Every observed value selected in every column (i.e., show everything).
    pub fn all_selected(dataset: &Dataset) -> Self {
        let selections = FilterColumn::ALL
            .into_iter()
            .map(|col| (col, dataset.options(col).iter().cloned().collect::<BTreeSet<_>>()))
            .collect();
        FilterSpec {
            selections,
            mode: FilterMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the accepted set of one column.
    pub fn select<I, S>(&mut self, column: FilterColumn, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(column, values.into_iter().map(Into::into).collect());
    }

    /// Whether `column` accepts every value the dataset contains.
    fn accepts_all(&self, dataset: &Dataset, column: FilterColumn) -> bool {
        match self.selections.get(&column) {
            None => true,
            Some(selected) => dataset
                .options(column)
                .iter()
                .all(|v| selected.contains(v)),
        }
    }

    fn column_matches(&self, record: &Record, column: FilterColumn) -> bool {
        match self.selections.get(&column) {
            None => true,
            Some(selected) => selected.contains(record.filter_value(column)),
        }
    }

    /// Apply the combination rule to a single record.
    pub fn matches(&self, record: &Record) -> bool {
        match self.mode {
            FilterMode::Any => FilterColumn::ALL
                .into_iter()
                .any(|col| self.column_matches(record, col)),
            FilterMode::All => FilterColumn::ALL
                .into_iter()
                .all(|col| self.column_matches(record, col)),
        }
    }
}

/// Return indices of records that pass the filter.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    // Under OR, one unconstrained column lets every row through.
    if spec.mode == FilterMode::Any
        && FilterColumn::ALL
            .into_iter()
            .any(|col| spec.accepts_all(dataset, col))
    {
        return (0..dataset.len()).collect();
    }

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(record))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – the selected rows of a dataset
// ---------------------------------------------------------------------------

/// The rows of a dataset that pass a [`FilterSpec`]. Never mutates the dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, spec: &FilterSpec) -> Self {
        let indices = filtered_indices(dataset, spec);
        log::debug!(
            "Filter ({:?}) kept {} of {} records",
            spec.mode,
            indices.len(),
            dataset.len()
        );
        FilteredView { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

impl RecordSource for FilteredView<'_> {
    fn columns(&self) -> &[Column] {
        &self.dataset.columns
    }

    fn rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.indices.iter().map(|&i| (i, &self.dataset.records[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, sample_dataset};

    fn three_rows() -> Dataset {
        Dataset::from_records(
            vec![
                record("A", "indoor", "10.0.0.1", "up", 3),
                record("B", "outdoor", "10.0.0.2", "down", 5),
                record("C", "indoor", "10.0.0.3", "down", 2),
            ],
            Column::REQUIRED.to_vec(),
        )
    }

    #[test]
    fn default_spec_keeps_every_row() {
        let ds = three_rows();
        let spec = FilterSpec::all_selected(&ds);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1, 2]);
        assert_eq!(filtered_indices(&ds, &FilterSpec::default()), vec![0, 1, 2]);
    }

    #[test]
    fn narrowing_one_column_still_keeps_every_row_under_or() {
        let ds = three_rows();
        let mut spec = FilterSpec::all_selected(&ds);
        spec.select(FilterColumn::Status, ["up"]);
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1, 2]);
    }

    #[test]
    fn or_combines_narrowed_columns() {
        let ds = three_rows();
        let mut spec = FilterSpec::all_selected(&ds);
        spec.select(FilterColumn::Name, ["A"]);
        spec.select(FilterColumn::ApType, ["outdoor"]);
        spec.select(FilterColumn::IpAddress, Vec::<String>::new());
        spec.select(FilterColumn::Status, Vec::<String>::new());
        // A by name, B by type; C matches nothing.
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1]);
    }

    #[test]
    fn empty_selection_contributes_nothing_to_or() {
        let ds = three_rows();
        let mut spec = FilterSpec::all_selected(&ds);
        spec.select(FilterColumn::Name, Vec::<String>::new());
        spec.select(FilterColumn::ApType, Vec::<String>::new());
        spec.select(FilterColumn::IpAddress, Vec::<String>::new());
        spec.select(FilterColumn::Status, ["down"]);
        assert_eq!(filtered_indices(&ds, &spec), vec![1, 2]);

        spec.select(FilterColumn::Status, Vec::<String>::new());
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn and_mode_intersects_columns() {
        let ds = three_rows();
        let mut spec = FilterSpec::all_selected(&ds).with_mode(FilterMode::All);
        spec.select(FilterColumn::ApType, ["indoor"]);
        spec.select(FilterColumn::Status, ["down"]);
        assert_eq!(filtered_indices(&ds, &spec), vec![2]);

        spec.select(FilterColumn::Name, Vec::<String>::new());
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn matching_is_exact() {
        let ds = sample_dataset();
        let mut spec = FilterSpec::all_selected(&ds).with_mode(FilterMode::All);
        spec.select(FilterColumn::Status, ["UP"]);
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn view_walks_selected_records() {
        let ds = three_rows();
        let mut spec = FilterSpec::all_selected(&ds).with_mode(FilterMode::All);
        spec.select(FilterColumn::Name, ["C", "A"]);
        let view = FilteredView::new(&ds, &spec);
        let names: Vec<&str> = view.records().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
        let rows: Vec<usize> = view.rows().map(|(i, _)| i).collect();
        assert_eq!(rows, [0, 2]);
    }
}
