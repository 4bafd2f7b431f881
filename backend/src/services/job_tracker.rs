//! Job tracking for async report generation.
//!
//! This module provides the in-memory state map behind report jobs. Entries
//! are created `Running` and move exactly once to `Complete` or `Error`.
//! Status and payload live in one enum, so a reader can never see a
//! `Complete` job without its CSV.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Job status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobStatus {
    Running,
    Complete,
    Error,
}

/// Job status together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
pub enum JobState {
    Running,
    Complete { csv: String },
    Error { error: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Running => JobStatus::Running,
            Self::Complete { .. } => JobStatus::Complete,
            Self::Error { .. } => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Job metadata and state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub job_id: String,
    pub state: JobState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// In-memory job tracker.
///
/// Entries are never evicted; they live until the process exits.
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl JobTracker {
    /// Create a new job tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new running job and return its ID.
    pub fn create_job(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        let job = Job {
            job_id: job_id.clone(),
            state: JobState::Running,
            created_at: chrono::Utc::now(),
            completed_at: None,
        };
        self.jobs.write().insert(job_id.clone(), job);
        job_id
    }

    /// Mark a job as complete with its CSV payload.
    ///
    /// Returns `false` if the job is unknown or already terminal.
    pub fn complete_job(&self, job_id: &str, csv: String) -> bool {
        self.finish(job_id, JobState::Complete { csv })
    }

    /// Mark a job as failed.
    ///
    /// Returns `false` if the job is unknown or already terminal.
    pub fn fail_job(&self, job_id: &str, error_message: impl Into<String>) -> bool {
        self.finish(
            job_id,
            JobState::Error {
                error: error_message.into(),
            },
        )
    }

    fn finish(&self, job_id: &str, state: JobState) -> bool {
        let mut jobs = self.jobs.write();
        match jobs.get_mut(job_id) {
            Some(job) if !job.state.is_terminal() => {
                job.state = state;
                job.completed_at = Some(chrono::Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Get a snapshot of a job by ID.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
