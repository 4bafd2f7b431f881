//! CSV loaders for the three source tables.
//!
//! Files are read once at startup. Structural problems (unreadable file,
//! missing header column) fail the load; individual malformed rows are
//! skipped and counted so one bad record never blocks the service.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::catalog::ScheduleCatalog;
use super::error::{DataError, DataResult, ErrorContext};
use super::observations::ObservationStore;
use super::StoreTables;
use crate::config::DataSettings;
use crate::models::{
    parse_time_of_day, parse_timestamp_utc, BusinessHoursEntry, Observation, StoreStatus,
    StoreTimezone,
};

pub const OBSERVATIONS_TABLE: &str = "observations";
pub const BUSINESS_HOURS_TABLE: &str = "business_hours";
pub const TIMEZONES_TABLE: &str = "timezones";

/// Row counts for one loaded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

impl LoadSummary {
    fn accept(&mut self) {
        self.loaded += 1;
    }

    fn skip(&mut self, context: &ErrorContext, row: u64, reason: impl std::fmt::Display) {
        self.skipped += 1;
        let context = malformed_row(context, row, reason);
        debug!(%context, "Skipping malformed row");
    }

    fn report(&self, table: &str) {
        info!(table, loaded = self.loaded, skipped = self.skipped, "Loaded table");
        if self.skipped > 0 {
            warn!(table, skipped = self.skipped, "Some rows were malformed and ignored");
        }
    }
}

/// Context for a skipped row: the table's context plus the row and reason.
fn malformed_row(
    context: &ErrorContext,
    row: u64,
    reason: impl std::fmt::Display,
) -> ErrorContext {
    context
        .clone()
        .with_row(row)
        .with_details(reason.to_string())
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    store_id: String,
    timestamp_utc: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawBusinessHours {
    store_id: String,
    #[serde(alias = "dayOfWeek", alias = "day")]
    day_of_week: i64,
    start_time_local: String,
    end_time_local: String,
}

#[derive(Debug, Deserialize)]
struct RawTimezone {
    store_id: String,
    timezone_str: String,
}

/// Load all three tables from the files named in `settings`.
pub fn load_tables(settings: &DataSettings) -> DataResult<StoreTables> {
    let status = open(&settings.status_csv, OBSERVATIONS_TABLE)?;
    let hours = open(&settings.business_hours_csv, BUSINESS_HOURS_TABLE)?;
    let timezones = open(&settings.timezones_csv, TIMEZONES_TABLE)?;

    let (observations, _) = read_observations(
        status,
        ErrorContext::new(OBSERVATIONS_TABLE).with_path(&settings.status_csv),
    )?;
    let mut catalog = ScheduleCatalog::new();
    read_business_hours(
        hours,
        &mut catalog,
        ErrorContext::new(BUSINESS_HOURS_TABLE).with_path(&settings.business_hours_csv),
    )?;
    read_timezones(
        timezones,
        &mut catalog,
        ErrorContext::new(TIMEZONES_TABLE).with_path(&settings.timezones_csv),
    )?;

    Ok(StoreTables::new(observations, catalog))
}

/// Load all three tables from arbitrary readers.
pub fn load_tables_from_readers<S, H, T>(status: S, hours: H, timezones: T) -> DataResult<StoreTables>
where
    S: Read,
    H: Read,
    T: Read,
{
    let (observations, _) = read_observations(status, ErrorContext::new(OBSERVATIONS_TABLE))?;
    let mut catalog = ScheduleCatalog::new();
    read_business_hours(hours, &mut catalog, ErrorContext::new(BUSINESS_HOURS_TABLE))?;
    read_timezones(timezones, &mut catalog, ErrorContext::new(TIMEZONES_TABLE))?;
    Ok(StoreTables::new(observations, catalog))
}

fn open(path: &Path, table: &str) -> DataResult<File> {
    File::open(path).map_err(|e| DataError::io(e, ErrorContext::new(table).with_path(path)))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Fail unless every required column (or one of its aliases) is present.
fn require_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    required: &[&[&str]],
    context: &ErrorContext,
) -> DataResult<()> {
    let headers = reader
        .headers()
        .map_err(|e| DataError::csv(e, context.clone()))?;
    for names in required {
        if !names.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(DataError::missing_column(names[0], context.clone()));
        }
    }
    Ok(())
}

/// Read the observations table.
pub fn read_observations<R: Read>(
    reader: R,
    context: ErrorContext,
) -> DataResult<(ObservationStore, LoadSummary)> {
    let mut reader = csv_reader(reader);
    require_columns(
        &mut reader,
        &[&["store_id"], &["timestamp_utc"], &["status"]],
        &context,
    )?;

    let mut store = ObservationStore::new();
    let mut summary = LoadSummary::default();
    for (idx, record) in reader.deserialize::<RawObservation>().enumerate() {
        let row = idx as u64 + 1;
        let parsed = record.map_err(|e| e.to_string()).and_then(|raw| {
            let timestamp_utc = parse_timestamp_utc(&raw.timestamp_utc)?;
            let status = raw.status.parse::<StoreStatus>()?;
            Ok(Observation::new(raw.store_id, timestamp_utc, status))
        });
        match parsed {
            Ok(observation) => {
                store.insert(observation);
                summary.accept();
            }
            Err(reason) => summary.skip(&context, row, reason),
        }
    }

    summary.report(OBSERVATIONS_TABLE);
    Ok((store, summary))
}

/// Read the business-hours table into `catalog`.
pub fn read_business_hours<R: Read>(
    reader: R,
    catalog: &mut ScheduleCatalog,
    context: ErrorContext,
) -> DataResult<LoadSummary> {
    let mut reader = csv_reader(reader);
    require_columns(
        &mut reader,
        &[
            &["store_id"],
            &["day_of_week", "dayOfWeek", "day"],
            &["start_time_local"],
            &["end_time_local"],
        ],
        &context,
    )?;

    let mut summary = LoadSummary::default();
    for (idx, record) in reader.deserialize::<RawBusinessHours>().enumerate() {
        let row = idx as u64 + 1;
        let parsed = record.map_err(|e| e.to_string()).and_then(|raw| {
            let day = u8::try_from(raw.day_of_week)
                .ok()
                .filter(|d| *d <= 6)
                .ok_or_else(|| format!("day_of_week {} out of range 0..=6", raw.day_of_week))?;
            let start = parse_time_of_day(&raw.start_time_local)?;
            let end = parse_time_of_day(&raw.end_time_local)?;
            Ok(BusinessHoursEntry::new(raw.store_id, day, start, end))
        });
        match parsed {
            Ok(entry) => {
                if entry.is_overnight() {
                    warn!(
                        store_id = %entry.store_id,
                        day_of_week = entry.day_of_week,
                        start = %entry.start_local,
                        end = %entry.end_local,
                        "Overnight business hours are not supported; no sample will match this entry"
                    );
                }
                catalog.insert_business_hours(entry);
                summary.accept();
            }
            Err(reason) => summary.skip(&context, row, reason),
        }
    }

    summary.report(BUSINESS_HOURS_TABLE);
    Ok(summary)
}

/// Read the timezone table into `catalog`.
///
/// Unknown IANA identifiers are skipped, which leaves the store without a
/// timezone and therefore out of every report.
pub fn read_timezones<R: Read>(
    reader: R,
    catalog: &mut ScheduleCatalog,
    context: ErrorContext,
) -> DataResult<LoadSummary> {
    let mut reader = csv_reader(reader);
    require_columns(&mut reader, &[&["store_id"], &["timezone_str"]], &context)?;

    let mut summary = LoadSummary::default();
    for (idx, record) in reader.deserialize::<RawTimezone>().enumerate() {
        let row = idx as u64 + 1;
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                summary.skip(&context, row, e);
                continue;
            }
        };
        let timezone = match raw.timezone_str.parse::<Tz>() {
            Ok(tz) => tz,
            Err(e) => {
                warn!(store_id = %raw.store_id, timezone = %raw.timezone_str, "Unknown timezone: {}", e);
                summary.skip(&context, row, e);
                continue;
            }
        };
        if catalog.insert_timezone(StoreTimezone::new(raw.store_id, timezone)) {
            summary.accept();
        } else {
            summary.skip(&context, row, "duplicate store_id");
        }
    }

    summary.report(TIMEZONES_TABLE);
    Ok(summary)
}
