//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;

use super::dto::{HealthResponse, ReportQuery, TriggerReportResponse};
use super::error::AppError;
use super::state::AppState;
use crate::models::StoreReportRow;
use crate::services::{JobState, JobStatus};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Service Info
// =============================================================================

/// GET /
pub async fn home() -> &'static str {
    "Store Monitoring System"
}

/// GET /health
///
/// Health check endpoint reporting the size of the loaded tables.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let tables = state.builder.tables();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stores: tables.catalog.store_count(),
        observations: tables.observations.len(),
    }))
}

// =============================================================================
// Synchronous Report
// =============================================================================

/// GET /report_data
///
/// Compute the report now and return its rows as JSON.
pub async fn report_data(State(state): State<AppState>) -> HandlerResult<Vec<StoreReportRow>> {
    let builder = state.builder.clone();
    let rows = tokio::task::spawn_blocking(move || builder.build()).await?;
    Ok(Json(rows))
}

// =============================================================================
// Async Report Jobs
// =============================================================================

/// POST /trigger_report
///
/// Start a background report. Returns the ID to poll.
pub async fn trigger_report(State(state): State<AppState>) -> HandlerResult<TriggerReportResponse> {
    let report_id = state.jobs.submit()?;
    Ok(Json(TriggerReportResponse { report_id }))
}

/// GET /get_report?report_id=...
///
/// Current state of a report job. A failed job is returned with HTTP 500.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Json<JobState>), AppError> {
    let report_id = query
        .report_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing report_id".to_string()))?;

    let job = state.jobs.get(&report_id)?;
    let status = match job.state {
        JobState::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    Ok((status, Json(job.state)))
}

/// GET /reports/{report_id}/csv
///
/// Download a finished report as a CSV attachment.
pub async fn download_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Response, AppError> {
    let job = state.jobs.get(&report_id)?;
    match job.state {
        JobState::Complete { csv } => {
            let disposition = format!("attachment; filename=\"report-{}.csv\"", report_id);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        JobState::Running => Err(AppError::Conflict(format!(
            "Report {} is still running",
            report_id
        ))),
        JobState::Error { error } => Err(AppError::JobFailed { report_id, error }),
    }
}

/// GET /reports/{report_id}/events
///
/// Stream report status via Server-Sent Events until the job is terminal.
pub async fn stream_report_events(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Verify job exists
    state.jobs.get(&report_id)?;

    let jobs = state.jobs.clone();
    let stream = async_stream::stream! {
        let mut last_status: Option<JobStatus> = None;
        loop {
            let Ok(job) = jobs.get(&report_id) else {
                break;
            };
            let status = job.state.status();

            if last_status != Some(status) {
                let event = serde_json::json!({
                    "report_id": report_id,
                    "status": status,
                });
                yield Ok(Event::default()
                    .event("status")
                    .data(serde_json::to_string(&event).unwrap_or_default()));
                last_status = Some(status);
            }

            if job.state.is_terminal() {
                let mut final_event = serde_json::json!({
                    "report_id": report_id,
                    "status": status,
                });
                if let JobState::Error { error } = &job.state {
                    final_event["error"] = serde_json::Value::String(error.clone());
                }
                yield Ok(Event::default()
                    .event("complete")
                    .data(serde_json::to_string(&final_event).unwrap_or_default()));
                break;
            }

            // Wait before checking again
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
