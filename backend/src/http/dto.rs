//! Data Transfer Objects for the HTTP API.
//!
//! Report rows and job states already derive Serialize and are returned
//! as-is; only the envelopes specific to HTTP live here.

use serde::{Deserialize, Serialize};

pub use crate::models::StoreReportRow;
pub use crate::services::JobState;

/// Response for report submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerReportResponse {
    /// Job ID to poll with `/get_report`
    pub report_id: String,
}

/// Query parameters for the report status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportQuery {
    #[serde(default)]
    pub report_id: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Stores with a known timezone
    pub stores: usize,
    /// Loaded observation rows
    pub observations: usize,
}
