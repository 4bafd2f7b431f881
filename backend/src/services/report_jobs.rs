//! Asynchronous report jobs.
//!
//! `submit` registers a `Running` job and hands the computation to a Tokio
//! task on the registry's runtime; callers poll `get` for the outcome. At most `max_concurrent_jobs`
//! reports compute at once; the rest wait for a permit while still reporting
//! `Running`. There is no cancellation.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{error, info};

use super::job_tracker::{Job, JobTracker};
use super::report::{to_csv, ReportBuilder, ReportError};

/// Something that can produce a complete CSV report.
pub trait ReportSource: Send + Sync {
    fn generate_csv(&self) -> Result<String, ReportError>;
}

impl ReportSource for ReportBuilder {
    fn generate_csv(&self) -> Result<String, ReportError> {
        to_csv(&self.build())
    }
}

/// Errors returned to callers of the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportJobError {
    #[error("Report job {job_id} not found")]
    UnknownJob { job_id: String },

    #[error("No Tokio runtime available to run report jobs")]
    NoRuntime,
}

/// Registry of report jobs and the pool that runs them.
#[derive(Clone)]
pub struct ReportJobRegistry {
    tracker: JobTracker,
    source: Arc<dyn ReportSource>,
    permits: Arc<Semaphore>,
    runtime: Option<Handle>,
}

impl ReportJobRegistry {
    /// Create a registry bound to the current Tokio runtime, if there is one.
    ///
    /// Without a current runtime, `submit` looks one up on each call.
    pub fn new(source: Arc<dyn ReportSource>, max_concurrent_jobs: usize) -> Self {
        Self::build(source, max_concurrent_jobs, Handle::try_current().ok())
    }

    /// Create a registry whose jobs always run on `runtime`.
    pub fn with_handle(
        source: Arc<dyn ReportSource>,
        max_concurrent_jobs: usize,
        runtime: Handle,
    ) -> Self {
        Self::build(source, max_concurrent_jobs, Some(runtime))
    }

    fn build(
        source: Arc<dyn ReportSource>,
        max_concurrent_jobs: usize,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            tracker: JobTracker::new(),
            source,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            runtime,
        }
    }

    /// Register a job and start computing it in the background.
    ///
    /// Returns immediately. Fails without registering anything when no
    /// runtime is available.
    pub fn submit(&self) -> Result<String, ReportJobError> {
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| ReportJobError::NoRuntime)?,
        };

        let job_id = self.tracker.create_job();
        info!(job_id = %job_id, "Report job submitted");

        runtime.spawn(run_report_job(
            job_id.clone(),
            self.tracker.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.permits),
        ));

        Ok(job_id)
    }

    /// Snapshot of a job's current state.
    pub fn get(&self, job_id: &str) -> Result<Job, ReportJobError> {
        self.tracker
            .get_job(job_id)
            .ok_or_else(|| ReportJobError::UnknownJob {
                job_id: job_id.to_string(),
            })
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }
}

/// Compute one report and record its terminal state.
///
/// Any failure, including a panic in the computation, ends as `Error`.
async fn run_report_job(
    job_id: String,
    tracker: JobTracker,
    source: Arc<dyn ReportSource>,
    permits: Arc<Semaphore>,
) {
    let _permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            tracker.fail_job(&job_id, format!("Report worker pool closed: {}", e));
            return;
        }
    };

    let outcome = tokio::task::spawn_blocking(move || source.generate_csv())
        .await
        .unwrap_or_else(|e| Err(ReportError::Aborted(e.to_string())));

    match outcome {
        Ok(csv) => {
            info!(job_id = %job_id, bytes = csv.len(), "Report job complete");
            tracker.complete_job(&job_id, csv);
        }
        Err(e) => {
            error!(job_id = %job_id, "Report job failed: {}", e);
            tracker.fail_job(&job_id, e.to_string());
        }
    }
}
