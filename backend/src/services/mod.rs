//! Service layer for uptime estimation and report generation.
//!
//! Services read the immutable source tables from [`crate::db`] and never
//! mutate them. The only shared mutable state is the job map owned by
//! [`report_jobs::ReportJobRegistry`].

pub mod job_tracker;
pub mod report;
pub mod report_jobs;
pub mod uptime;

pub use job_tracker::{Job, JobState, JobStatus, JobTracker};
pub use report::{to_csv, ReferenceClock, ReportBuilder, ReportError};
pub use report_jobs::{ReportJobError, ReportJobRegistry, ReportSource};
pub use uptime::{UptimeEstimate, UptimeEstimator};
