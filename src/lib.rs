//! Access-point inventory dashboard core.
//!
//! Upload a spreadsheet, filter its rows, sum `Total_AP` by one column, project
//! the result into bar/pie/line/donut charts and export the table and charts.
//! Every stage is a pure function of explicit inputs; see [`dashboard::render`].

pub mod chart;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod export;

pub use chart::{ChartKind, ChartSet, ChartSpec, PieBasis, Template};
pub use dashboard::{render, summarize, AggregateSource, DashboardOptions, DashboardView};
pub use data::aggregate::{group_sum, GroupOrder, GroupRow, GroupedTable};
pub use data::filter::{FilterMode, FilterSpec, FilteredView};
pub use data::loader::{load_file, parse_bytes, FileFormat};
pub use data::model::{CellValue, Dataset, Record, RecordSource};
pub use data::schema::{Column, FilterColumn, GroupBy};
pub use error::{AggregationError, DashboardError, EncodeError, InvalidGroupingError, ParseError};
pub use export::ExportArtifact;
