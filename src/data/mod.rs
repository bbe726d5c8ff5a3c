/// Data layer: core types, loading, filtering and the derived views.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → ObservationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ ObservationTable │  Vec<Observation>, province/crop/year domains
///   └──────────────────┘
///        │  + FilterSelection
///        ▼
///   ┌──────────┐     ┌─────────┐
///   │  filter  │ ──► │  stats  │  correlation, OLS, box summaries
///   └──────────┘     └─────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views   │  compute_views → DerivedViews (six chart datasets)
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod views;
