//! Service configuration.
//!
//! Settings come from an optional TOML file, then environment overrides.
//! Every key has a default, so an absent file is not an error.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::services::report::ReferenceClock;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "STORE_MONITOR_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Locations of the three source tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_status_csv")]
    pub status_csv: PathBuf,
    #[serde(default = "default_business_hours_csv")]
    pub business_hours_csv: PathBuf,
    #[serde(default = "default_timezones_csv")]
    pub timezones_csv: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            status_csv: default_status_csv(),
            business_hours_csv: default_business_hours_csv(),
            timezones_csv: default_timezones_csv(),
        }
    }
}

impl DataSettings {
    /// Point every table at `dir`, keeping the current file names.
    pub fn rooted_at(&self, dir: &Path) -> Self {
        let reroot = |p: &Path| match p.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(p),
        };
        Self {
            status_csv: reroot(&self.status_csv),
            business_hours_csv: reroot(&self.business_hours_csv),
            timezones_csv: reroot(&self.timezones_csv),
        }
    }
}

/// Report computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// `now`, `latest_observation`, or an RFC 3339 instant
    #[serde(default = "default_reference_time")]
    pub reference_time: String,
    /// Upper bound on report jobs computing at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            reference_time: default_reference_time(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

impl ReportSettings {
    pub fn reference_clock(&self) -> Result<ReferenceClock, ConfigError> {
        ReferenceClock::from_str(&self.reference_time)
            .map_err(|e| ConfigError::invalid("report.reference_time", e))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_status_csv() -> PathBuf {
    PathBuf::from("data/status.csv")
}

fn default_business_hours_csv() -> PathBuf {
    PathBuf::from("data/business_hours.csv")
}

fn default_timezones_csv() -> PathBuf {
    PathBuf::from("data/timezones.csv")
}

fn default_reference_time() -> String {
    "now".to_string()
}

fn default_max_concurrent_jobs() -> usize {
    4
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the first standard location that exists.
    ///
    /// Searches for `store-monitor.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from("store-monitor.toml"),
            PathBuf::from("backend/store-monitor.toml"),
            PathBuf::from("../store-monitor.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve configuration for the running process.
    ///
    /// `STORE_MONITOR_CONFIG` wins over the standard locations; defaults are
    /// used when neither yields a file. Environment overrides apply last.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location()?.unwrap_or_default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Recognized keys: `HOST`, `PORT`, `STORE_MONITOR_DATA_DIR`,
    /// `REPORT_REFERENCE_TIME`, `MAX_CONCURRENT_JOBS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", "must be a valid port number"))?;
        }
        if let Some(dir) = lookup("STORE_MONITOR_DATA_DIR") {
            self.data = self.data.rooted_at(Path::new(&dir));
        }
        if let Some(reference) = lookup("REPORT_REFERENCE_TIME") {
            self.report.reference_time = reference;
        }
        if let Some(max) = lookup("MAX_CONCURRENT_JOBS") {
            self.report.max_concurrent_jobs = max
                .parse()
                .map_err(|_| ConfigError::invalid("MAX_CONCURRENT_JOBS", "must be an integer"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.max_concurrent_jobs == 0 {
            return Err(ConfigError::invalid(
                "report.max_concurrent_jobs",
                "must be at least 1",
            ));
        }
        self.report.reference_clock()?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
