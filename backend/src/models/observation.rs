//! Store status observations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status reported by a single poll of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown store status: {}", other)),
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Inactive => f.write_str("inactive"),
        }
    }
}

/// One row of the observations table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub store_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub status: StoreStatus,
}

impl Observation {
    pub fn new(
        store_id: impl Into<String>,
        timestamp_utc: DateTime<Utc>,
        status: StoreStatus,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            timestamp_utc,
            status,
        }
    }

    pub fn is_inactive(&self) -> bool {
        self.status == StoreStatus::Inactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!("active".parse::<StoreStatus>().unwrap(), StoreStatus::Active);
        assert_eq!(" Inactive ".parse::<StoreStatus>().unwrap(), StoreStatus::Inactive);
        assert!("closed".parse::<StoreStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&StoreStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
        assert_eq!(StoreStatus::Active.to_string(), "active");
    }
}
