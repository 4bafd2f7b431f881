//! Business hours and timezone lookups.

use std::collections::HashMap;

use chrono::Weekday;
use chrono_tz::Tz;

use crate::models::{BusinessHoursEntry, StoreTimezone};

/// Read-only catalog of per-store schedules and timezones.
///
/// The timezone table defines which stores exist for reporting, and in
/// what order they are reported.
#[derive(Debug, Clone, Default)]
pub struct ScheduleCatalog {
    hours: HashMap<String, Vec<BusinessHoursEntry>>,
    hours_len: usize,
    timezones: Vec<StoreTimezone>,
    timezone_index: HashMap<String, usize>,
}

impl ScheduleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts<H, T>(hours: H, timezones: T) -> Self
    where
        H: IntoIterator<Item = BusinessHoursEntry>,
        T: IntoIterator<Item = StoreTimezone>,
    {
        let mut catalog = Self::new();
        for entry in hours {
            catalog.insert_business_hours(entry);
        }
        for tz in timezones {
            catalog.insert_timezone(tz);
        }
        catalog
    }

    pub(crate) fn insert_business_hours(&mut self, entry: BusinessHoursEntry) {
        self.hours_len += 1;
        self.hours
            .entry(entry.store_id.clone())
            .or_default()
            .push(entry);
    }

    /// Register a store timezone. The first entry for a store wins; returns
    /// `false` when the store was already present.
    pub(crate) fn insert_timezone(&mut self, tz: StoreTimezone) -> bool {
        if self.timezone_index.contains_key(&tz.store_id) {
            return false;
        }
        self.timezone_index
            .insert(tz.store_id.clone(), self.timezones.len());
        self.timezones.push(tz);
        true
    }

    pub fn timezone(&self, store_id: &str) -> Option<Tz> {
        self.timezone_index
            .get(store_id)
            .map(|&idx| self.timezones[idx].timezone)
    }

    /// Business hours for a store on a local weekday.
    ///
    /// Duplicate entries for the same day are not validated; the first one
    /// loaded is returned.
    pub fn business_hours(&self, store_id: &str, weekday: Weekday) -> Option<&BusinessHoursEntry> {
        let day = weekday.num_days_from_monday() as u8;
        self.hours
            .get(store_id)?
            .iter()
            .find(|entry| entry.day_of_week == day)
    }

    /// Store ids from the timezone table, in load order.
    pub fn store_ids(&self) -> impl Iterator<Item = &str> {
        self.timezones.iter().map(|tz| tz.store_id.as_str())
    }

    pub fn store_count(&self) -> usize {
        self.timezones.len()
    }

    pub fn business_hours_len(&self) -> usize {
        self.hours_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_first_timezone_wins() {
        let catalog = ScheduleCatalog::from_parts(
            vec![],
            vec![
                StoreTimezone::new("s1", chrono_tz::America::Chicago),
                StoreTimezone::new("s2", chrono_tz::UTC),
                StoreTimezone::new("s1", chrono_tz::Asia::Tokyo),
            ],
        );
        assert_eq!(catalog.store_count(), 2);
        assert_eq!(catalog.timezone("s1"), Some(chrono_tz::America::Chicago));
        assert_eq!(catalog.timezone("nope"), None);
        assert_eq!(catalog.store_ids().collect::<Vec<_>>(), vec!["s1", "s2"]);
    }

    #[test]
    fn test_business_hours_first_match_per_day() {
        let catalog = ScheduleCatalog::from_parts(
            vec![
                BusinessHoursEntry::new("s1", 0, hm(9, 0), hm(17, 0)),
                BusinessHoursEntry::new("s1", 0, hm(6, 0), hm(23, 0)),
                BusinessHoursEntry::new("s1", 2, hm(10, 0), hm(14, 0)),
            ],
            vec![],
        );
        assert_eq!(catalog.business_hours_len(), 3);
        let monday = catalog.business_hours("s1", Weekday::Mon).unwrap();
        assert_eq!(monday.start_local, hm(9, 0));
        assert!(catalog.business_hours("s1", Weekday::Tue).is_none());
        assert!(catalog.business_hours("s2", Weekday::Mon).is_none());
    }
}
