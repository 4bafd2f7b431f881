//! Store report assembly and CSV export.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::uptime::UptimeEstimator;
use crate::db::{ObservationStore, StoreTables};
use crate::models::{parse_timestamp_utc, round2, ReportWindow, StoreReportRow};

/// Errors that prevent a report from being produced at all.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush report buffer: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Report computation aborted: {0}")]
    Aborted(String),
}

/// Where a report's reference instant comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceClock {
    /// Wall clock at build time
    SystemNow,
    /// Newest observation in the table (wall clock if the table is empty)
    LatestObservation,
    /// A pinned instant
    Fixed(DateTime<Utc>),
}

impl ReferenceClock {
    pub fn resolve(&self, observations: &ObservationStore) -> DateTime<Utc> {
        match self {
            Self::SystemNow => Utc::now(),
            Self::LatestObservation => observations.latest_timestamp().unwrap_or_else(Utc::now),
            Self::Fixed(instant) => *instant,
        }
    }
}

impl FromStr for ReferenceClock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "now" | "system" => Ok(Self::SystemNow),
            "latest_observation" | "latest" => Ok(Self::LatestObservation),
            _ => parse_timestamp_utc(s).map(Self::Fixed).map_err(|_| {
                format!(
                    "expected 'now', 'latest_observation' or an RFC 3339 instant, got '{}'",
                    s
                )
            }),
        }
    }
}

/// Builds one report row per store known to the timezone table.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    tables: Arc<StoreTables>,
    clock: ReferenceClock,
}

impl ReportBuilder {
    pub fn new(tables: Arc<StoreTables>) -> Self {
        Self {
            tables,
            clock: ReferenceClock::SystemNow,
        }
    }

    pub fn with_clock(mut self, clock: ReferenceClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn tables(&self) -> &StoreTables {
        &self.tables
    }

    pub fn clock(&self) -> ReferenceClock {
        self.clock
    }

    /// Instant the next `build()` will measure windows back from.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.clock.resolve(&self.tables.observations)
    }

    /// Build the report, resolving the reference instant once.
    pub fn build(&self) -> Vec<StoreReportRow> {
        self.build_at(self.reference_time())
    }

    /// Build the report with every window ending at `now`.
    ///
    /// Stores without a timezone are omitted.
    pub fn build_at(&self, now: DateTime<Utc>) -> Vec<StoreReportRow> {
        let estimator = UptimeEstimator::new(&self.tables);
        let rows: Vec<StoreReportRow> = self
            .tables
            .catalog
            .store_ids()
            .filter_map(|store_id| build_row(&estimator, store_id, now))
            .collect();

        info!(stores = rows.len(), %now, "Built store report");
        rows
    }
}

fn build_row(
    estimator: &UptimeEstimator<'_>,
    store_id: &str,
    now: DateTime<Utc>,
) -> Option<StoreReportRow> {
    let hour = estimator.estimate_window(store_id, now, ReportWindow::LastHour)?;
    let day = estimator
        .estimate_window(store_id, now, ReportWindow::LastDay)
        .unwrap_or_default();
    let week = estimator
        .estimate_window(store_id, now, ReportWindow::LastWeek)
        .unwrap_or_default();

    Some(StoreReportRow {
        store_id: store_id.to_string(),
        uptime_minutes_1h: round2(hour.uptime_minutes()),
        uptime_hours_1d: round2(day.uptime_minutes() / 60.0),
        uptime_hours_1w: round2(week.uptime_minutes() / 60.0),
        downtime_minutes_1h: round2(hour.downtime_minutes),
        downtime_hours_1d: round2(day.downtime_minutes / 60.0),
        downtime_hours_1w: round2(week.downtime_minutes / 60.0),
    })
}

/// Serialize report rows to CSV, header first.
///
/// An empty report is a single empty header line.
pub fn to_csv(rows: &[StoreReportRow]) -> Result<String, ReportError> {
    if rows.is_empty() {
        return Ok("\r\n".to_string());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
