/// Data layer: core types, loading, cleaning and querying.
///
/// Architecture:
/// ```text
///  sample table / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  raw Dataset + IQR-cleaned Dataset (clean)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  continent/year filters, top-N ranking → Vec<Row>
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
pub mod query;
pub mod store;
