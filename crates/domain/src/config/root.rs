use serde::{Deserialize, Serialize};

use super::blocking::BlockingConfig;
use super::cache::{CacheConfig, CacheType};
use super::errors::ConfigError;
use super::health::HealthConfig;
use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;
use super::middleware::MiddlewareConfig;
use super::server::ServerConfig;
use super::update::UpdateConfig;
use super::upstream::UpstreamConfig;
use crate::provider::Provider;

/// Main configuration structure for Ferrous Relay
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub middleware: MiddlewareConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-relay.toml in current directory
    /// 3. /etc/ferrous-relay/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-relay.toml").exists() {
            Self::from_file("ferrous-relay.toml")?
        } else if std::path::Path::new("/etc/ferrous-relay/config.toml").exists() {
            Self::from_file("/etc/ferrous-relay/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen_address {
            self.server.listen_address = listen;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration before any component is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.upstream.primary_providers().is_empty() {
            return Err(ConfigError::Validation(format!(
                "No {} providers configured",
                self.upstream.upstream_type.as_str()
            )));
        }

        let all_providers = self
            .upstream
            .primary_providers()
            .iter()
            .chain(&self.upstream.plaintext_providers);
        for name in all_providers {
            if Provider::by_name(name).is_none() {
                let known: Vec<&str> = Provider::names().collect();
                return Err(ConfigError::Validation(format!(
                    "Unknown upstream provider '{}' (known: {})",
                    name,
                    known.join(", ")
                )));
            }
        }

        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout cannot be 0".to_string(),
            ));
        }

        if self.cache.cache_type == CacheType::Lru && self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "LRU cache requires max_entries > 0".to_string(),
            ));
        }

        self.blocking
            .parsed_blocked_ips()
            .map_err(ConfigError::Validation)?;
        self.blocking
            .parsed_blocked_prefixes()
            .map_err(ConfigError::Validation)?;

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen_address: Option<String>,
    pub log_level: Option<String>,
}
