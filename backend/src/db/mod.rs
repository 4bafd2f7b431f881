//! Source tables for store monitoring.
//!
//! Three read-only tables are loaded once at startup and shared, unlocked,
//! by every request and background job:
//!
//! ```text
//! status.csv ─────────► ObservationStore ─┐
//!                                          ├─► StoreTables (Arc, immutable)
//! business_hours.csv ─┐                    │
//!                     ├► ScheduleCatalog ──┘
//! timezones.csv ──────┘
//! ```

pub mod catalog;
pub mod error;
pub mod loader;
pub mod observations;

pub use catalog::ScheduleCatalog;
pub use error::{DataError, DataResult, ErrorContext};
pub use loader::{load_tables, load_tables_from_readers, LoadSummary};
pub use observations::ObservationStore;

/// All source tables, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct StoreTables {
    pub observations: ObservationStore,
    pub catalog: ScheduleCatalog,
}

impl StoreTables {
    pub fn new(observations: ObservationStore, catalog: ScheduleCatalog) -> Self {
        Self {
            observations,
            catalog,
        }
    }
}
