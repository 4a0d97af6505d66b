use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidGroupingError;

// ---------------------------------------------------------------------------
// Column – every column the inventory sheet knows about
// ---------------------------------------------------------------------------

/// A known column of the access-point inventory sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Name,
    ApType,
    IpAddress,
    Status,
    TotalAp,
    SwitchIp,
}

impl Column {
    /// Columns that must be present in every upload, in sheet order.
    pub const REQUIRED: [Column; 5] = [
        Column::Name,
        Column::ApType,
        Column::IpAddress,
        Column::Status,
        Column::TotalAp,
    ];

    /// Exact header text in the sheet.
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::ApType => "AP_Type",
            Column::IpAddress => "IP_Address",
            Column::Status => "Status",
            Column::TotalAp => "Total_AP",
            Column::SwitchIp => "Switch IP",
        }
    }

    /// Look up a column by its exact header text (no trimming, case-sensitive).
    pub fn from_header(header: &str) -> Option<Column> {
        Self::REQUIRED
            .iter()
            .chain(std::iter::once(&Column::SwitchIp))
            .copied()
            .find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// FilterColumn – the four sidebar multi-selects
// ---------------------------------------------------------------------------

/// A column with a sidebar multi-select filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterColumn {
    Name,
    ApType,
    IpAddress,
    Status,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 4] = [
        FilterColumn::Name,
        FilterColumn::ApType,
        FilterColumn::IpAddress,
        FilterColumn::Status,
    ];

    pub fn column(self) -> Column {
        match self {
            FilterColumn::Name => Column::Name,
            FilterColumn::ApType => Column::ApType,
            FilterColumn::IpAddress => Column::IpAddress,
            FilterColumn::Status => Column::Status,
        }
    }

    /// Sidebar caption.
    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Name => "Select Department Name:",
            FilterColumn::ApType => "Select AP type:",
            FilterColumn::IpAddress => "Select IP Address:",
            FilterColumn::Status => "Select Status:",
        }
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().header())
    }
}

// ---------------------------------------------------------------------------
// GroupBy – the "What would you like to analyse?" choice
// ---------------------------------------------------------------------------

/// A column the aggregator can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum GroupBy {
    #[default]
    Name,
    IpAddress,
    SwitchIp,
    Status,
    ApType,
}

impl GroupBy {
    /// Selection order shown to the user.
    pub const ALL: [GroupBy; 5] = [
        GroupBy::Name,
        GroupBy::IpAddress,
        GroupBy::SwitchIp,
        GroupBy::Status,
        GroupBy::ApType,
    ];

    pub fn column(self) -> Column {
        match self {
            GroupBy::Name => Column::Name,
            GroupBy::IpAddress => Column::IpAddress,
            GroupBy::SwitchIp => Column::SwitchIp,
            GroupBy::Status => Column::Status,
            GroupBy::ApType => Column::ApType,
        }
    }

    pub fn header(self) -> &'static str {
        self.column().header()
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for GroupBy {
    type Err = InvalidGroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.header() == s)
            .ok_or_else(|| InvalidGroupingError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_parses_exact_headers() {
        assert_eq!("Switch IP".parse::<GroupBy>(), Ok(GroupBy::SwitchIp));
        assert_eq!("AP_Type".parse::<GroupBy>(), Ok(GroupBy::ApType));
    }

    #[test]
    fn group_by_rejects_unknown_and_total() {
        assert_eq!(
            "Foo".parse::<GroupBy>(),
            Err(InvalidGroupingError::Unknown("Foo".into()))
        );
        // Total_AP is the summed column, not a grouping dimension.
        assert!("Total_AP".parse::<GroupBy>().is_err());
        // Header matching is case-sensitive.
        assert!("status".parse::<GroupBy>().is_err());
    }

    #[test]
    fn from_header_is_exact() {
        assert_eq!(Column::from_header("IP_Address"), Some(Column::IpAddress));
        assert_eq!(Column::from_header("Switch IP"), Some(Column::SwitchIp));
        assert_eq!(Column::from_header(" Name"), None);
    }
}
