use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::RecordSource;
use super::schema::GroupBy;
use crate::error::{AggregationError, DashboardError, InvalidGroupingError};

/// Order of the rows in a [`GroupedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupOrder {
    /// Groups appear in the order their key is first seen.
    #[default]
    FirstSeen,
    /// Groups sorted ascending by key.
    Sorted,
}

/// One aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: String,
    pub total: f64,
}

/// `Total_AP` summed per distinct value of the grouping column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTable {
    pub group_by: GroupBy,
    pub rows: Vec<GroupRow>,
}

impl GroupedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.key.clone()).collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.total).collect()
    }

    /// Sum over all groups.
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.key == key).map(|r| r.total)
    }
}

/// Fail with [`InvalidGroupingError::Absent`] when the source has no such column.
pub(crate) fn require_column<S: RecordSource + ?Sized>(
    source: &S,
    group_by: GroupBy,
) -> Result<(), InvalidGroupingError> {
    if source.has_column(group_by.column()) {
        Ok(())
    } else {
        Err(InvalidGroupingError::Absent(group_by.header()))
    }
}

/// Group `source` by `group_by` and sum `Total_AP` within each group.
///
/// Either the full dataset or a filtered view can be passed.
pub fn group_sum<S: RecordSource + ?Sized>(
    source: &S,
    group_by: GroupBy,
    order: GroupOrder,
) -> Result<GroupedTable, DashboardError> {
    require_column(source, group_by)?;
    let column = group_by.column();

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<GroupRow> = Vec::new();

    for (index, record) in source.rows() {
        // Sheet row: 1-based, after the header.
        let amount = record.total_ap.as_total(index + 2)?;
        let key = record.text(column).unwrap_or_default();

        let slot = *slots.entry(key).or_insert_with(|| {
            rows.push(GroupRow {
                key: key.to_string(),
                total: 0.0,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.total += amount;
        if !row.total.is_finite() {
            return Err(AggregationError::Overflow {
                key: row.key.clone(),
            }
            .into());
        }
    }

    if order == GroupOrder::Sorted {
        rows.sort_by(|a, b| a.key.cmp(&b.key));
    }

    log::debug!("Grouped by {group_by} into {} groups", rows.len());
    Ok(GroupedTable { group_by, rows })
}

/// Like [`group_sum`], taking the grouping column by its header text.
pub fn group_sum_by_name<S: RecordSource + ?Sized>(
    source: &S,
    group_by: &str,
    order: GroupOrder,
) -> Result<GroupedTable, DashboardError> {
    let group_by: GroupBy = group_by.parse()?;
    group_sum(source, group_by, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterMode, FilterSpec, FilteredView};
    use crate::data::model::tests::{record, sample_dataset};
    use crate::data::model::{CellValue, Dataset};
    use crate::data::schema::{Column, FilterColumn};

    fn inventory() -> Dataset {
        let mut records = vec![
            record("Lab", "indoor", "10.0.0.1", "up", 4),
            record("Office", "outdoor", "10.0.0.2", "down", 2),
            record("Lab", "outdoor", "10.0.0.3", "up", 6),
            record("Annex", "indoor", "10.0.0.4", "up", 1),
        ];
        for (r, switch) in records.iter_mut().zip(["s2", "s1", "s2", "s1"]) {
            r.switch_ip = switch.to_string();
        }
        let mut columns = Column::REQUIRED.to_vec();
        columns.push(Column::SwitchIp);
        Dataset::from_records(records, columns)
    }

    #[test]
    fn groups_by_status_in_first_seen_order() {
        let table = group_sum(&sample_dataset(), GroupBy::Status, GroupOrder::FirstSeen).unwrap();
        assert_eq!(
            table.rows,
            vec![
                GroupRow { key: "up".into(), total: 3.0 },
                GroupRow { key: "down".into(), total: 5.0 },
            ]
        );
    }

    #[test]
    fn unknown_grouping_name_is_rejected() {
        let err = group_sum_by_name(&sample_dataset(), "Foo", GroupOrder::FirstSeen).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidGrouping(InvalidGroupingError::Unknown(ref s)) if s == "Foo"
        ));
    }

    #[test]
    fn switch_ip_requires_the_column() {
        let err = group_sum(&sample_dataset(), GroupBy::SwitchIp, GroupOrder::FirstSeen).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidGrouping(InvalidGroupingError::Absent("Switch IP"))
        ));

        let table = group_sum(&inventory(), GroupBy::SwitchIp, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.get("s2"), Some(10.0));
        assert_eq!(table.get("s1"), Some(3.0));
    }

    #[test]
    fn non_numeric_total_fails() {
        let mut ds = sample_dataset();
        ds.records[1].total_ap = CellValue::Text("N/A".into());
        let err = group_sum(&ds, GroupBy::Status, GroupOrder::FirstSeen).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Aggregation(AggregationError::NonNumeric { row: 3, ref value }) if value == "N/A"
        ));
    }

    #[test]
    fn overflow_fails() {
        let mut ds = sample_dataset();
        ds.records[0].status = "down".into();
        ds.records[0].total_ap = CellValue::Float(f64::MAX);
        ds.records[1].total_ap = CellValue::Float(f64::MAX);
        let err = group_sum(&ds, GroupBy::Status, GroupOrder::FirstSeen).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Aggregation(AggregationError::Overflow { ref key }) if key == "down"
        ));
    }

    #[test]
    fn totals_are_conserved_for_every_grouping() {
        let ds = inventory();
        for group_by in GroupBy::ALL {
            let table = group_sum(&ds, group_by, GroupOrder::FirstSeen).unwrap();
            assert_eq!(table.grand_total(), 13.0, "grouping by {group_by}");
        }
    }

    #[test]
    fn one_row_per_distinct_key() {
        let table = group_sum(&inventory(), GroupBy::Name, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.keys(), ["Lab", "Office", "Annex"]);
        assert_eq!(table.totals(), [10.0, 2.0, 1.0]);
    }

    #[test]
    fn sorted_order() {
        let table = group_sum(&inventory(), GroupBy::Name, GroupOrder::Sorted).unwrap();
        assert_eq!(table.keys(), ["Annex", "Lab", "Office"]);
    }

    #[test]
    fn aggregates_a_filtered_view() {
        let ds = inventory();
        let mut spec = FilterSpec::all_selected(&ds).with_mode(FilterMode::All);
        spec.select(FilterColumn::ApType, ["indoor"]);
        let view = FilteredView::new(&ds, &spec);
        let table = group_sum(&view, GroupBy::Status, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.rows, vec![GroupRow { key: "up".into(), total: 5.0 }]);
    }

    #[test]
    fn empty_totals_count_as_zero() {
        let mut ds = sample_dataset();
        ds.records[0].total_ap = CellValue::Empty;
        let table = group_sum(&ds, GroupBy::Name, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.get("A"), Some(0.0));
    }

    #[test]
    fn fractional_totals_are_summed() {
        let mut ds = sample_dataset();
        ds.records[0].total_ap = CellValue::Float(2.5);
        ds.records[1].status = "up".into();
        ds.records[1].total_ap = CellValue::Float(0.5);
        let table = group_sum(&ds, GroupBy::Status, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.rows, vec![GroupRow { key: "up".into(), total: 3.0 }]);
    }

    #[test]
    fn large_whole_totals_are_summed() {
        let mut ds = sample_dataset();
        ds.records[0].total_ap = CellValue::Float(1e20);
        let table = group_sum(&ds, GroupBy::Name, GroupOrder::FirstSeen).unwrap();
        assert_eq!(table.get("A"), Some(1e20));
    }
}
