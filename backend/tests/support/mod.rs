#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use store_monitor::db::{load_tables_from_readers, StoreTables};
use store_monitor::services::{Job, ReferenceClock, ReportBuilder, ReportJobRegistry};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Observations for three stores. GHOST has no timezone entry.
pub const STATUS_CSV: &str = "store_id,status,timestamp_utc
S1,active,2023-01-23 10:00:00.000000 UTC
S1,inactive,2023-01-23 10:30:00 UTC
S1,active,2023-01-23 11:00:00 UTC
S2,inactive,2023-01-23 15:00:00 UTC
S2,inactive,2023-01-23 15:45:00 UTC
GHOST,active,2023-01-23 10:15:00 UTC
";

pub const BUSINESS_HOURS_CSV: &str = "store_id,dayOfWeek,start_time_local,end_time_local
S1,0,09:00:00,17:00:00
S2,0,09:00:00,17:00:00
GHOST,0,00:00:00,23:59:59
";

/// S2 is in Chicago, so its 15:00 UTC poll is 09:00 local.
pub const TIMEZONES_CSV: &str = "store_id,timezone_str
S1,UTC
S2,America/Chicago
";

/// 2023-01-23 (a Monday) at the given UTC time.
pub fn monday(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 23, h, m, 0).unwrap()
}

/// Reference instant the sample reports are measured from.
pub fn reference_time() -> DateTime<Utc> {
    monday(16, 0)
}

pub fn sample_tables() -> StoreTables {
    load_tables_from_readers(
        STATUS_CSV.as_bytes(),
        BUSINESS_HOURS_CSV.as_bytes(),
        TIMEZONES_CSV.as_bytes(),
    )
    .expect("sample tables load")
}

pub fn sample_builder() -> Arc<ReportBuilder> {
    Arc::new(
        ReportBuilder::new(Arc::new(sample_tables()))
            .with_clock(ReferenceClock::Fixed(reference_time())),
    )
}

/// Poll a job until it leaves `Running`, failing the test after five seconds.
pub async fn wait_for_terminal(registry: &ReportJobRegistry, job_id: &str) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = registry.get(job_id).expect("job exists");
        if job.state.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} did not finish in time",
            job_id
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
