//! Configuration management for the gofed services.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use gofed_server::config::ServiceConfig;
//!
//! // Load from file with env overrides
//! let config = ServiceConfig::load("gofed.yaml")?;
//!
//! // Or load from environment only
//! let config = ServiceConfig::from_env()?;
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "GOFED";

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServiceConfig {
    /// Service identity
    #[serde(default)]
    pub service: ServiceSettings,

    /// Admission gate settings
    #[serde(default)]
    pub gate: GateSettings,

    /// Record cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Batch resolver settings
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Simulated backing source settings
    #[serde(default)]
    pub source: SourceSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Service identity settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServiceSettings {
    /// Name attached to logs and metric labels
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "gofed".to_string()
}

/// Admission gate settings.
///
/// Environment variable: `GOFED_GATE__CAPACITY`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GateSettings {
    /// Maximum number of fetches in flight per service
    #[serde(default = "default_gate_capacity")]
    pub capacity: usize,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            capacity: default_gate_capacity(),
        }
    }
}

fn default_gate_capacity() -> usize {
    3
}

/// Record cache settings.
///
/// # Example YAML Configuration
///
/// ```yaml
/// cache:
///   capacity: 100
///   ttl_secs: 300
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CacheSettings {
    /// Maximum number of cached records
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry lifetime in seconds. `None` keeps entries until evicted.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

fn default_cache_capacity() -> usize {
    100
}

fn default_cache_ttl() -> Option<u64> {
    Some(300)
}

/// Batch resolver settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResolverSettings {
    /// Deadline for gate waits within one batch, in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum keys per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl ResolverSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

fn default_max_batch_size() -> usize {
    100
}

/// Simulated latency of the backing sources.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SourceSettings {
    /// Delay applied to every product fetch, in milliseconds
    #[serde(default = "default_products_latency")]
    pub products_latency_ms: u64,

    /// Delay applied to every user fetch, in milliseconds
    #[serde(default)]
    pub users_latency_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            products_latency_ms: default_products_latency(),
            users_latency_ms: 0,
        }
    }
}

impl SourceSettings {
    pub fn products_latency(&self) -> Duration {
        Duration::from_millis(self.products_latency_ms)
    }

    pub fn users_latency(&self) -> Duration {
        Duration::from_millis(self.users_latency_ms)
    }
}

fn default_products_latency() -> u64 {
    200
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ServiceConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `GOFED_` and use `__` as separator.
    /// For example:
    /// - `GOFED_GATE__CAPACITY=5` overrides `gate.capacity`
    /// - `GOFED_CACHE__TTL_SECS=60` overrides `cache.ttl_secs`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ServiceConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(env_source())
            .build()?;

        let service_config: ServiceConfig = config.try_deserialize()?;
        service_config.validate()?;

        Ok(service_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServiceConfig::default())?)
            .add_source(env_source())
            .build()?;

        let service_config: ServiceConfig = config.try_deserialize()?;
        service_config.validate()?;

        Ok(service_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: "service.name cannot be empty".to_string(),
            });
        }

        if self.gate.capacity == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "gate.capacity must be greater than 0".to_string(),
            });
        }

        if self.cache.capacity == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "cache.capacity must be greater than 0".to_string(),
            });
        }

        if self.cache.ttl_secs == Some(0) {
            return Err(ConfigLoadError::Invalid {
                message: "cache.ttl_secs must be greater than 0 when set".to_string(),
            });
        }

        if self.resolver.max_batch_size == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "resolver.max_batch_size must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

/// `GOFED_CACHE__CAPACITY` -> `cache.capacity`
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test: Can load config from YAML file
    #[test]
    #[serial]
    fn test_can_load_config_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service:
  name: products

gate:
  capacity: 5

cache:
  capacity: 10
  ttl_secs: 60

resolver:
  timeout_ms: 1500
  max_batch_size: 20

source:
  products_latency_ms: 50

logging:
  level: debug
  json: true

metrics:
  enabled: false
"#
        )
        .unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();

        assert_eq!(config.service.name, "products");
        assert_eq!(config.gate.capacity, 5);
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.resolver.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.resolver.max_batch_size, 20);
        assert_eq!(config.source.products_latency(), Duration::from_millis(50));
        assert_eq!(config.source.users_latency(), Duration::ZERO);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(!config.metrics.enabled);
    }

    /// Test: Can override config with env vars
    #[test]
    #[serial]
    fn test_can_override_config_with_env_vars() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
gate:
  capacity: 2

cache:
  capacity: 10
"#
        )
        .unwrap();

        std::env::set_var("GOFED_GATE__CAPACITY", "7");
        std::env::set_var("GOFED_LOGGING__LEVEL", "warn");

        let config = ServiceConfig::load(file.path());

        std::env::remove_var("GOFED_GATE__CAPACITY");
        std::env::remove_var("GOFED_LOGGING__LEVEL");

        let config = config.unwrap();
        assert_eq!(config.gate.capacity, 7); // Overridden by env
        assert_eq!(config.cache.capacity, 10); // From file
        assert_eq!(config.logging.level, "warn"); // Overridden by env
    }

    /// Test: Config validation catches errors
    #[test]
    fn test_config_validation_catches_errors() {
        let cases: [(fn(&mut ServiceConfig), &str); 6] = [
            (|c| c.gate.capacity = 0, "gate.capacity"),
            (|c| c.cache.capacity = 0, "cache.capacity"),
            (|c| c.cache.ttl_secs = Some(0), "cache.ttl_secs"),
            (|c| c.resolver.max_batch_size = 0, "resolver.max_batch_size"),
            (|c| c.logging.level = "verbose".to_string(), "logging.level"),
            (|c| c.service.name = "  ".to_string(), "service.name"),
        ];

        for (mutate, field) in cases {
            let mut config = ServiceConfig::default();
            mutate(&mut config);

            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigLoadError::Invalid { .. }));
            assert!(
                err.to_string().contains(field),
                "error for {field} should name the field, got: {err}"
            );
        }
    }

    /// Test: Invalid config returns clear error
    #[test]
    fn test_invalid_config_returns_clear_error() {
        let result = ServiceConfig::load("/nonexistent/path/gofed.yaml");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: syntax: [").unwrap();

        let err = ServiceConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Load(_)));
    }

    /// Test: Default config is valid
    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.service.name, "gofed");
        assert_eq!(config.gate.capacity, 3);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.resolver.timeout(), None);
        assert_eq!(config.resolver.max_batch_size, 100);
        assert_eq!(config.source.products_latency(), Duration::from_millis(200));
        assert_eq!(config.logging.level, "info");
        assert!(config.metrics.enabled);
    }

    /// Test: from_env loads defaults with env overrides
    #[test]
    #[serial]
    fn test_from_env_loads_defaults_with_env_overrides() {
        std::env::set_var("GOFED_CACHE__CAPACITY", "42");

        let config = ServiceConfig::from_env();

        std::env::remove_var("GOFED_CACHE__CAPACITY");

        let config = config.unwrap();
        assert_eq!(config.cache.capacity, 42);
        assert_eq!(config.gate.capacity, 3); // default
    }

    /// Test: invalid env override is rejected by validation
    #[test]
    #[serial]
    fn test_from_env_rejects_zero_gate_capacity() {
        std::env::set_var("GOFED_GATE__CAPACITY", "0");

        let result = ServiceConfig::from_env();

        std::env::remove_var("GOFED_GATE__CAPACITY");

        assert!(matches!(result, Err(ConfigLoadError::Invalid { .. })));
    }
}
