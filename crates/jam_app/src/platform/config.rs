//! Dashboard configuration, read from a RON file.
//!
//! Lookup order: the path in `JAM_DASHBOARD_CONFIG`, then
//! `./jam_dashboard.ron`. A missing file yields defaults; a file that exists
//! but does not parse is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jam_core::CoreSettings;
use jam_engine::{ApiSettings, EngineSettings};
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use super::logging::LogDestination;

pub const CONFIG_ENV: &str = "JAM_DASHBOARD_CONFIG";
const CONFIG_FILENAME: &str = "jam_dashboard.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid log level {0:?}")]
    LogLevel(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub page_size: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub target_collection_name: String,
    pub reset_selection_on_page_change: bool,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let core = CoreSettings::default();
        Self {
            base_url: ApiSettings::default().base_url,
            poll_interval_secs: EngineSettings::default().poll_interval.as_secs(),
            page_size: core.page_size,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            target_collection_name: core.target_collection_name,
            reset_selection_on_page_change: core.reset_selection_on_page_change,
            log_level: "info".to_string(),
            log_destination: LogDestination::Terminal,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Zero("poll_interval_secs"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        self.log_level_filter().map(|_| ())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            page_size: self.page_size,
            target_collection_name: self.target_collection_name.clone(),
            reset_selection_on_page_change: self.reset_selection_on_page_change,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Loads the config from the standard locations.
pub fn load() -> Result<DashboardConfig, ConfigError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DashboardConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: DashboardConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use log::LevelFilter;
    use tempfile::TempDir;

    use super::{load_from, ConfigError, DashboardConfig};
    use crate::platform::logging::LogDestination;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_from(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.target_collection_name, "Liked Companies");
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jam_dashboard.ron");
        fs::write(
            &path,
            r#"(
                base_url: "http://backend:9000",
                poll_interval_secs: 3,
                log_level: "debug",
                log_destination: Both,
            )"#,
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.engine_settings().poll_interval.as_secs(), 3);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(config.log_destination, LogDestination::Both);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jam_dashboard.ron");
        fs::write(&path, "(base_url: ").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jam_dashboard.ron");
        fs::write(&path, "(poll_interval_secs: 0)").unwrap();
        assert!(matches!(
            load_from(&path),
            Err(ConfigError::Zero("poll_interval_secs"))
        ));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let config = DashboardConfig {
            log_level: "loud".to_string(),
            ..DashboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::LogLevel(_))));
    }
}
