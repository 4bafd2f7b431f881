//! Uptime and downtime estimation from discrete status polls.
//!
//! Polls arrive irregularly and only while someone is watching, so the
//! estimate is a step interpolation: the gap between two consecutive polls
//! that both fall inside local business hours is attributed entirely to the
//! status seen by the later poll. Polls outside business hours are dropped
//! before pairing, so they neither open nor close a gap.
//!
//! The first accepted poll in a window has no predecessor and contributes
//! nothing. This under-counts the leading gap and is kept as-is.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::db::{ObservationStore, ScheduleCatalog, StoreTables};
use crate::models::{Observation, ReportWindow};

/// Minutes accumulated over one window for one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UptimeEstimate {
    /// Minutes covered by consecutive in-hours polls
    pub total_minutes: f64,
    /// Portion of `total_minutes` closed by an inactive poll
    pub downtime_minutes: f64,
}

impl UptimeEstimate {
    pub fn uptime_minutes(&self) -> f64 {
        self.total_minutes - self.downtime_minutes
    }
}

/// An observation seen from its store's timezone. Computed once per sample.
#[derive(Debug, Clone, Copy)]
struct LocalSample<'a> {
    observation: &'a Observation,
    weekday: Weekday,
    time_of_day: NaiveTime,
}

impl<'a> LocalSample<'a> {
    fn new(observation: &'a Observation, tz: Tz) -> Self {
        let local = observation.timestamp_utc.with_timezone(&tz);
        Self {
            observation,
            weekday: local.weekday(),
            time_of_day: local.time(),
        }
    }
}

/// Estimates per-store uptime against the schedule catalog.
#[derive(Debug, Clone, Copy)]
pub struct UptimeEstimator<'a> {
    observations: &'a ObservationStore,
    catalog: &'a ScheduleCatalog,
}

impl<'a> UptimeEstimator<'a> {
    pub fn new(tables: &'a StoreTables) -> Self {
        Self::from_parts(&tables.observations, &tables.catalog)
    }

    pub fn from_parts(observations: &'a ObservationStore, catalog: &'a ScheduleCatalog) -> Self {
        Self {
            observations,
            catalog,
        }
    }

    /// Estimate minutes of uptime and downtime for `store_id` over
    /// `[now - window, now]`.
    ///
    /// Returns `None` when the store has no timezone, and a zero estimate
    /// when it has no observations in the window.
    pub fn estimate(
        &self,
        store_id: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Option<UptimeEstimate> {
        let tz = self.catalog.timezone(store_id)?;

        let mut samples: Vec<&Observation> = self
            .observations
            .between(store_id, now - window, now)
            .collect();
        if samples.is_empty() {
            return Some(UptimeEstimate::default());
        }
        // Status breaks timestamp ties so any input order gives the same pairing.
        samples.sort_by_key(|o| (o.timestamp_utc, o.status));

        let included = samples
            .into_iter()
            .map(|o| LocalSample::new(o, tz))
            .filter(|sample| self.in_business_hours(store_id, sample))
            .map(|sample| sample.observation);
        let estimate = accumulate(included);

        debug!(
            store_id,
            window_minutes = window.num_minutes(),
            total = estimate.total_minutes,
            downtime = estimate.downtime_minutes,
            "Estimated store uptime"
        );
        Some(estimate)
    }

    pub fn estimate_window(
        &self,
        store_id: &str,
        now: DateTime<Utc>,
        window: ReportWindow,
    ) -> Option<UptimeEstimate> {
        self.estimate(store_id, now, window.duration())
    }

    fn in_business_hours(&self, store_id: &str, sample: &LocalSample<'_>) -> bool {
        self.catalog
            .business_hours(store_id, sample.weekday)
            .is_some_and(|hours| hours.contains(sample.time_of_day))
    }
}

/// Pair consecutive samples, attributing each gap to the later sample.
fn accumulate<'o, I>(samples: I) -> UptimeEstimate
where
    I: IntoIterator<Item = &'o Observation>,
{
    let mut estimate = UptimeEstimate::default();
    let mut previous: Option<DateTime<Utc>> = None;

    for observation in samples {
        if let Some(previous) = previous {
            let delta = minutes_between(previous, observation.timestamp_utc);
            estimate.total_minutes += delta;
            if observation.is_inactive() {
                estimate.downtime_minutes += delta;
            }
        }
        previous = Some(observation.timestamp_utc);
    }

    estimate
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
#[path = "uptime_tests.rs"]
mod tests;
