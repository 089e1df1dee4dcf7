//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! settings file, then `QUOTAWATCH_*` environment variables, then command
//! line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use quotawatch_adapters::client::DEFAULT_ENDPOINT;

/// Environment variable prefix, e.g. `QUOTAWATCH_ENDPOINT`.
pub const ENV_PREFIX: &str = "QUOTAWATCH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the console backend.
    pub endpoint: String,
    /// Refresh interval of the monitoring view.
    pub monitoring_refresh_secs: u64,
    /// Refresh interval of the quota and policy views.
    pub quota_refresh_secs: u64,
    /// How many consumers the ranking keeps.
    pub top_consumers: usize,
    pub request_timeout_secs: u64,
    /// Log destination. Stdout belongs to the TUI.
    pub log_file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            monitoring_refresh_secs: 5,
            quota_refresh_secs: 30,
            top_consumers: 10,
            request_timeout_secs: 10,
            log_file: PathBuf::from("quotawatch.log"),
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub monitoring_refresh_secs: Option<u64>,
    pub quota_refresh_secs: Option<u64>,
    pub top_consumers: Option<usize>,
}

impl Settings {
    /// Load settings from every layer.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(file, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        file: Option<&Path>,
        overrides: &Overrides,
        environment: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(environment.try_parsing(true))
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option(
                "monitoring_refresh_secs",
                overrides.monitoring_refresh_secs.map(|v| v as i64),
            )?
            .set_override_option(
                "quota_refresh_secs",
                overrides.quota_refresh_secs.map(|v| v as i64),
            )?
            .set_override_option("top_consumers", overrides.top_consumers.map(|v| v as i64))?
            .build()
            .context("failed to read settings")?
            .try_deserialize()
            .context("invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.endpoint.trim().is_empty(), "endpoint must not be empty");
        ensure!(
            self.monitoring_refresh_secs > 0 && self.quota_refresh_secs > 0,
            "refresh intervals must be at least one second"
        );
        ensure!(self.top_consumers > 0, "top_consumers must be at least 1");
        Ok(())
    }

    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring_refresh_secs)
    }

    pub fn quota_interval(&self) -> Duration {
        Duration::from_secs(self.quota_refresh_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use tokio_test::{assert_err, assert_ok};

    /// An environment layer that never reads the process environment.
    fn empty_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = assert_ok!(Settings::load_with_env(
            None,
            &Overrides::default(),
            empty_env()
        ));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.monitoring_interval(), Duration::from_secs(5));
        assert_eq!(settings.quota_interval(), Duration::from_secs(30));
        assert_eq!(settings.endpoint, "http://127.0.0.1:5000/api");
    }

    #[test]
    fn test_file_then_overrides() {
        let file = settings_file(
            "endpoint = \"http://storage01:5000/api\"\nquota_refresh_secs = 60\ntop_consumers = 5\n",
        );
        let overrides = Overrides {
            top_consumers: Some(3),
            ..Default::default()
        };

        let settings = assert_ok!(Settings::load_with_env(
            Some(file.path()),
            &overrides,
            empty_env()
        ));
        assert_eq!(settings.endpoint, "http://storage01:5000/api");
        assert_eq!(settings.quota_refresh_secs, 60);
        assert_eq!(settings.top_consumers, 3);
        assert_eq!(settings.monitoring_refresh_secs, 5);
    }

    #[test]
    fn test_environment_layer() {
        let vars = HashMap::from([
            ("QUOTAWATCH_MONITORING_REFRESH_SECS".to_string(), "2".to_string()),
            ("QUOTAWATCH_LOG_LEVEL".to_string(), "debug".to_string()),
        ]);
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(vars));

        let settings = Settings::load_with_env(None, &Overrides::default(), env).unwrap();
        assert_eq!(settings.monitoring_refresh_secs, 2);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = Overrides {
            monitoring_refresh_secs: Some(0),
            ..Default::default()
        };
        let err = assert_err!(Settings::load_with_env(None, &overrides, empty_env()));
        assert!(err.to_string().contains("refresh intervals"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_err!(Settings::load_with_env(
            Some(&path),
            &Overrides::default(),
            empty_env()
        ));
    }
}
