//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OGTAG_*)
//! 2. TOML config file (if OGTAG_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How invocations reach the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `POST /` over HTTP.
    #[default]
    Http,
    /// MCP tool on stdin/stdout.
    Stdio,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OGTAG_*)
/// 2. TOML config file (if OGTAG_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via OGTAG_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for upstream requests. The HTTP client sends none when unset.
    ///
    /// Set via OGTAG_USER_AGENT environment variable.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via OGTAG_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via OGTAG_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via OGTAG_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Compute the cache day stamp in local time instead of UTC.
    ///
    /// Set via OGTAG_LOCAL_TIME environment variable.
    #[serde(default)]
    pub local_time: bool,

    /// Listen address for the HTTP transport.
    ///
    /// Set via OGTAG_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Transport to serve: `http` or `stdio`.
    ///
    /// Set via OGTAG_TRANSPORT environment variable.
    #[serde(default)]
    pub transport: Transport,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ogtag-cache.sqlite")
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: None,
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            local_time: false,
            bind_addr: default_bind_addr(),
            transport: Transport::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Current calendar day under the configured clock convention.
    pub fn today(&self) -> NaiveDate {
        if self.local_time { Local::now().date_naive() } else { Utc::now().date_naive() }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OGTAG_`
    /// 2. TOML file from `OGTAG_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OGTAG_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OGTAG_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./ogtag-cache.sqlite"));
        assert_eq!(config.user_agent, None);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 10);
        assert!(!config.local_time);
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.transport, Transport::Http);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_today_utc() {
        let config = AppConfig::default();
        let before = Utc::now().date_naive();
        let today = config.today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn test_load_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("OGTAG_DB_PATH", "/tmp/og.sqlite");
            jail.set_env("OGTAG_TRANSPORT", "stdio");
            jail.set_env("OGTAG_TIMEOUT_MS", "5000");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.db_path, PathBuf::from("/tmp/og.sqlite"));
            assert_eq!(config.transport, Transport::Stdio);
            assert_eq!(config.timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_load_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("ogtag.toml", "user_agent = \"from-file\"\nmax_redirects = 3\n")?;
            jail.set_env("OGTAG_CONFIG_FILE", "ogtag.toml");
            jail.set_env("OGTAG_MAX_REDIRECTS", "7");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.user_agent.as_deref(), Some("from-file"));
            assert_eq!(config.max_redirects, 7);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("OGTAG_MAX_BYTES", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
