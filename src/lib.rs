//! Pakistan agriculture and climate dashboard.
//!
//! The reusable core is [`data::views::compute_views`], a pure function from
//! the loaded table and the current (province, crop, year) selection to the
//! six chart datasets, and [`presentation::present`], which attaches labels
//! and sizing for a given [`presentation::DeviceClass`].

pub mod color;
pub mod data;
pub mod presentation;

pub use data::error::LoadError;
pub use data::loader::load_file;
pub use data::model::{FilterSelection, Metric, Observation, ObservationTable};
pub use data::views::{DerivedViews, compute_views};
pub use presentation::{Dashboard, DeviceClass, present};
