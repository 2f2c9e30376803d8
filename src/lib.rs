// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod derive;
pub mod fetch;
pub mod history;
pub mod index;
pub mod metrics;
pub mod normalize;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::IndexConfig;
pub use crate::index::{compute_index, interpret_index, IndexReport};
pub use crate::normalize::{normalize, normalize_inverted};
pub use crate::snapshot::EconomicSnapshot;
