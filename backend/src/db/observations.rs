//! In-memory observations table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::Observation;

/// Read-only table of status polls, indexed by store.
///
/// Rows are kept in load order; nothing here sorts them. Consumers that need
/// chronological order sort their own selection.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    by_store: HashMap<String, Vec<Observation>>,
    len: usize,
    latest: Option<DateTime<Utc>>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut store = Self::new();
        for observation in observations {
            store.insert(observation);
        }
        store
    }

    pub(crate) fn insert(&mut self, observation: Observation) {
        self.latest = self.latest.max(Some(observation.timestamp_utc));
        self.len += 1;
        self.by_store
            .entry(observation.store_id.clone())
            .or_default()
            .push(observation);
    }

    /// Total number of observations across all stores.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct stores with at least one observation.
    pub fn store_count(&self) -> usize {
        self.by_store.len()
    }

    /// All observations of a store, in load order.
    pub fn for_store(&self, store_id: &str) -> &[Observation] {
        self.by_store
            .get(store_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Observations of a store with `timestamp_utc >= since`.
    pub fn since<'a>(
        &'a self,
        store_id: &str,
        since: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.for_store(store_id)
            .iter()
            .filter(move |o| o.timestamp_utc >= since)
    }

    /// Observations of a store inside the closed interval `[start, end]`.
    pub fn between<'a>(
        &'a self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.since(store_id, start)
            .filter(move |o| o.timestamp_utc <= end)
    }

    /// Most recent instant in the table.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreStatus;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 23, h, m, 0).unwrap()
    }

    fn sample_store() -> ObservationStore {
        ObservationStore::from_observations(vec![
            Observation::new("a", at(11, 0), StoreStatus::Active),
            Observation::new("b", at(9, 0), StoreStatus::Inactive),
            Observation::new("a", at(10, 0), StoreStatus::Inactive),
            Observation::new("a", at(12, 0), StoreStatus::Active),
        ])
    }

    #[test]
    fn test_counts_and_latest() {
        let store = sample_store();
        assert_eq!(store.len(), 4);
        assert_eq!(store.store_count(), 2);
        assert_eq!(store.latest_timestamp(), Some(at(12, 0)));
        assert!(ObservationStore::new().latest_timestamp().is_none());
    }

    #[test]
    fn test_for_store_keeps_load_order() {
        let store = sample_store();
        let times: Vec<_> = store.for_store("a").iter().map(|o| o.timestamp_utc).collect();
        assert_eq!(times, vec![at(11, 0), at(10, 0), at(12, 0)]);
        assert!(store.for_store("missing").is_empty());
    }

    #[test]
    fn test_since_and_between() {
        let store = sample_store();
        assert_eq!(store.since("a", at(10, 30)).count(), 2);
        assert_eq!(store.between("a", at(10, 0), at(11, 0)).count(), 2);
        assert_eq!(store.between("b", at(10, 0), at(11, 0)).count(), 0);
    }
}
