/// Data layer: schema, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → RawSheet → Dataset (schema checked once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Record>, per-column filter options
///   └──────────┘
///        │                        │
///        ▼                        ▼
///   ┌──────────┐            ┌───────────┐
///   │  filter   │ → view    │ aggregate │  group + sum Total_AP → GroupedTable
///   └──────────┘            └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
