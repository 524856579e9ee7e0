use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use feed_logging::{feed_info, feed_warn};
use log::LevelFilter;
use moviefeed_engine::{CatalogSettings, SearchSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

const DEFAULT_CONFIG_FILENAME: &str = "moviefeed.ron";
const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub language: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let defaults = CatalogSettings::default();
        Self {
            base_url: defaults.base_url,
            api_key: defaults.api_key,
            bearer_token: defaults.bearer_token,
            language: defaults.language,
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            max_bytes: defaults.max_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let defaults = SearchSettings::default();
        Self {
            debounce_ms: defaults.debounce.as_millis() as u64,
            min_query_len: defaults.min_query_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub destination: LogDestination,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::default(),
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::Info)
    }
}

impl AppConfig {
    pub fn catalog_settings(&self) -> CatalogSettings {
        let catalog = &self.catalog;
        CatalogSettings {
            base_url: catalog.base_url.clone(),
            api_key: catalog.api_key.clone(),
            bearer_token: catalog.bearer_token.clone(),
            language: catalog.language.clone(),
            connect_timeout: Duration::from_secs(catalog.connect_timeout_secs),
            request_timeout: Duration::from_secs(catalog.request_timeout_secs),
            max_bytes: catalog.max_bytes,
        }
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.search.debounce_ms),
            min_query_len: self.search.min_query_len,
        }
    }

    /// A non-empty key from the environment wins over the file.
    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.catalog.api_key = Some(key);
        }
        self
    }
}

/// Load configuration from `path`, or from `./moviefeed.ron` when present.
///
/// An explicit path must exist; the implicit default file is optional.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => read_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
            if default_path.exists() {
                read_file(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };
    Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    feed_info!("Loaded configuration from {:?}", path);
    if config.catalog.api_key.is_none() && config.catalog.bearer_token.is_none() {
        feed_warn!("No catalog credentials in {:?}; set {}", path, API_KEY_ENV);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("moviefeed.ron");
        fs::write(
            &path,
            r#"(
                catalog: (api_key: Some("abc"), language: None),
                search: (debounce_ms: 250),
                log: (destination: Terminal, level: "debug"),
            )"#,
        )
        .unwrap();

        let config = read_file(&path).unwrap();

        assert_eq!(config.catalog.api_key.as_deref(), Some("abc"));
        assert_eq!(config.catalog.language, None);
        assert_eq!(config.catalog.base_url, CatalogSettings::default().base_url);
        assert_eq!(config.search_settings().debounce, Duration::from_millis(250));
        assert_eq!(config.search_settings().min_query_len, SearchSettings::default().min_query_len);
        assert_eq!(config.log.destination, LogDestination::Terminal);
        assert_eq!(config.log.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn defaults_mirror_engine_settings() {
        let config = AppConfig::default();
        assert_eq!(config.search_settings(), SearchSettings::default());
        let catalog = config.catalog_settings();
        let defaults = CatalogSettings::default();
        assert_eq!(catalog.base_url, defaults.base_url);
        assert_eq!(catalog.request_timeout, defaults.request_timeout);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(catalog: [").unwrap();
        assert!(matches!(read_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn environment_key_overrides_file_unless_blank() {
        let config = AppConfig::default().with_api_key_override(Some("env-key".to_string()));
        assert_eq!(config.catalog.api_key.as_deref(), Some("env-key"));

        let config = config.with_api_key_override(Some("  ".to_string()));
        assert_eq!(config.catalog.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let log = LogConfig {
            level: "loud".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(log.level_filter(), LevelFilter::Info);
    }
}
