//! Report rows and the trailing windows they cover.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Trailing window over which uptime and downtime are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportWindow {
    LastHour,
    LastDay,
    LastWeek,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 3] = [Self::LastHour, Self::LastDay, Self::LastWeek];

    pub fn duration(self) -> Duration {
        match self {
            Self::LastHour => Duration::hours(1),
            Self::LastDay => Duration::days(1),
            Self::LastWeek => Duration::weeks(1),
        }
    }
}

/// CSV column order of [`StoreReportRow`].
pub const REPORT_CSV_HEADER: [&str; 7] = [
    "store_id",
    "uptime_last_hour_minutes",
    "uptime_last_day_hours",
    "uptime_last_week_hours",
    "downtime_last_hour_minutes",
    "downtime_last_day_hours",
    "downtime_last_week_hours",
];

/// One store's line in the report. Hour-window values are in minutes,
/// day and week values in hours, all rounded to two decimals.
///
/// Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReportRow {
    pub store_id: String,
    #[serde(rename = "uptime_last_hour_minutes")]
    pub uptime_minutes_1h: f64,
    #[serde(rename = "uptime_last_day_hours")]
    pub uptime_hours_1d: f64,
    #[serde(rename = "uptime_last_week_hours")]
    pub uptime_hours_1w: f64,
    #[serde(rename = "downtime_last_hour_minutes")]
    pub downtime_minutes_1h: f64,
    #[serde(rename = "downtime_last_day_hours")]
    pub downtime_hours_1d: f64,
    #[serde(rename = "downtime_last_week_hours")]
    pub downtime_hours_1w: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_durations() {
        assert_eq!(ReportWindow::LastHour.duration().num_minutes(), 60);
        assert_eq!(ReportWindow::LastDay.duration().num_hours(), 24);
        assert_eq!(ReportWindow::LastWeek.duration().num_days(), 7);
    }

    #[test]
    fn test_row_json_uses_report_column_names() {
        let row = StoreReportRow {
            store_id: "s1".into(),
            uptime_minutes_1h: 30.0,
            uptime_hours_1d: 1.5,
            uptime_hours_1w: 10.0,
            downtime_minutes_1h: 30.0,
            downtime_hours_1d: 0.5,
            downtime_hours_1w: 2.0,
        };
        let value = serde_json::to_value(&row).unwrap();
        let object = value.as_object().unwrap();
        for column in REPORT_CSV_HEADER {
            assert!(object.contains_key(column), "missing {}", column);
        }
    }
}
