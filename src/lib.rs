// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod charts;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod map;
pub mod metrics;
pub mod palette;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::dataset::{load, Dataset, Record};
pub use crate::filter::{FilterSelection, FilteredView, Summary};
pub use crate::palette::Palette;
