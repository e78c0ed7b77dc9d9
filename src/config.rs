//! Application-level configuration loading: cache location, sync cadence and
//! retry limits.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COURTSIDE_BACK_CONFIG_PATH";

/// Inclusive bounds accepted for a team size.
pub const TEAM_SIZE_RANGE: std::ops::RangeInclusive<usize> = 2..=12;
const DEFAULT_TEAM_SIZE: usize = 6;

/// Timeout and retry budget for one class of remote calls.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Per-attempt timeout.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "timeout_ms")]
    pub timeout: Duration,
}

impl RetrySettings {
    /// Snapshot reads and fetches.
    pub const READ: Self = Self {
        max_retries: 2,
        timeout: Duration::from_millis(5_000),
    };
    /// Creates, replaces and deletes.
    pub const WRITE: Self = Self {
        max_retries: 1,
        timeout: Duration::from_millis(8_000),
    };
}

/// Immutable runtime configuration shared across the application.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one JSON file per cached collection.
    pub cache_dir: PathBuf,
    /// Period of the remote snapshot feed while online.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "snapshot_interval_ms")]
    pub snapshot_interval: Duration,
    /// Period of the storage supervisor health checks.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "health_poll_interval_ms")]
    pub health_poll_interval: Duration,
    /// Policy for snapshot reads and fetches.
    pub read_retry: RetrySettings,
    /// Policy for creates, replaces and deletes.
    pub write_retry: RetrySettings,
    /// Team size used when a team config is created without one.
    pub default_team_size: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        cache_dir = %config.cache_dir.display(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; missing fields take their default value.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let mut config: Self = serde_json::from_str(contents)?;
        if !TEAM_SIZE_RANGE.contains(&config.default_team_size) {
            warn!(
                team_size = config.default_team_size,
                "default_team_size out of range; using {DEFAULT_TEAM_SIZE}"
            );
            config.default_team_size = DEFAULT_TEAM_SIZE;
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            snapshot_interval: Duration::from_secs(30),
            health_poll_interval: Duration::from_secs(5),
            read_retry: RetrySettings::READ,
            write_retry: RetrySettings::WRITE,
            default_team_size: DEFAULT_TEAM_SIZE,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.read_retry.max_retries, 2);
        assert_eq!(config.write_retry.timeout, Duration::from_millis(8_000));
    }

    #[test]
    fn durations_are_read_as_milliseconds() {
        let config = AppConfig::from_json(
            r#"{
                "cache_dir": "/tmp/courtside",
                "snapshot_interval_ms": 1500,
                "read_retry": { "max_retries": 4, "timeout_ms": 250 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/courtside"));
        assert_eq!(config.snapshot_interval, Duration::from_millis(1500));
        assert_eq!(
            config.read_retry,
            RetrySettings {
                max_retries: 4,
                timeout: Duration::from_millis(250),
            }
        );
        assert_eq!(config.write_retry, RetrySettings::WRITE);
    }

    #[test]
    fn out_of_range_team_size_falls_back() {
        let config = AppConfig::from_json(r#"{ "default_team_size": 40 }"#).unwrap();
        assert_eq!(config.default_team_size, DEFAULT_TEAM_SIZE);
    }

    #[test]
    fn malformed_retry_block_is_rejected() {
        assert!(AppConfig::from_json(r#"{ "read_retry": { "max_retries": 1 } }"#).is_err());
    }
}
