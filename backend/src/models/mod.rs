//! Domain models for store status monitoring.
//!
//! Everything here is plain data: rows loaded once from the source tables,
//! and the derived report rows produced by the service layer.

pub mod observation;
pub mod report;
pub mod schedule;
pub mod time;

pub use observation::*;
pub use report::*;
pub use schedule::*;
pub use time::*;
