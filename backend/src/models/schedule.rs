//! Per-store business hours and timezones.

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A store's local opening interval for one day of the week.
///
/// `day_of_week` follows the Monday = 0 convention. Intervals spanning
/// midnight (`end_local < start_local`) are not supported; such an entry
/// never contains any time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHoursEntry {
    pub store_id: String,
    pub day_of_week: u8,
    pub start_local: NaiveTime,
    pub end_local: NaiveTime,
}

impl BusinessHoursEntry {
    pub fn new(
        store_id: impl Into<String>,
        day_of_week: u8,
        start_local: NaiveTime,
        end_local: NaiveTime,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            day_of_week,
            start_local,
            end_local,
        }
    }

    /// Weekday this entry applies to, if `day_of_week` is in range.
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_index(self.day_of_week)
    }

    pub fn is_overnight(&self) -> bool {
        self.end_local < self.start_local
    }

    /// Whether a local time-of-day falls inside `[start_local, end_local]`.
    pub fn contains(&self, local_time: NaiveTime) -> bool {
        self.start_local <= local_time && local_time <= self.end_local
    }
}

/// Map a Monday = 0 day index onto a [`Weekday`].
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// IANA timezone of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimezone {
    pub store_id: String,
    pub timezone: Tz,
}

impl StoreTimezone {
    pub fn new(store_id: impl Into<String>, timezone: Tz) -> Self {
        Self {
            store_id: store_id.into(),
            timezone,
        }
    }
}
