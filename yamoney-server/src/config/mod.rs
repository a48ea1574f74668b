//! Configuration module for yamoney-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use yamoney_core::config::{PaymentDefaults, ServerConfig, SharedConfig};
use yamoney_core::entities::payment::MAX_URL_LEN;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub defaults: PaymentDefaults,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.defaults)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides and validate.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.parse(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn parse(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let ym = &config.yandex_money;
    if ym.shop_id < 0 {
        return Err(ConfigError::ValidationError(
            "yandex_money.shop_id must not be negative".to_string(),
        ));
    }
    if ym.scid < 0 {
        return Err(ConfigError::ValidationError(
            "yandex_money.scid must not be negative".to_string(),
        ));
    }
    for (name, url) in [("success_url", &ym.success_url), ("fail_url", &ym.fail_url)] {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "yandex_money.{name} must be an http(s) URL, got {url}"
            )));
        }
        if url.as_str().chars().count() as u64 > MAX_URL_LEN {
            return Err(ConfigError::ValidationError(format!(
                "yandex_money.{name} is longer than {MAX_URL_LEN} characters"
            )));
        }
    }
    let prefix = &config.server.prefix;
    if !prefix.is_empty() && !prefix.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "server.prefix must start with '/', got {prefix:?}"
        )));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let ym = file_config.yandex_money;
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            prefix: file_config.server.prefix.trim_end_matches('/').to_string(),
        },
        defaults: PaymentDefaults::new(ym.shop_id, ym.scid, ym.success_url, ym.fail_url),
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
