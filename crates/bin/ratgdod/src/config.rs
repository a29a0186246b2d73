//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `ratgdo.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;

use serde::Deserialize;

use ratgdo_app::config::BridgeConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings.
    pub bridge: BridgeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Broker connections to create on the virtual connector.
    pub brokers: Vec<BrokerConfig>,
    /// Devices to register with the host.
    pub devices: Vec<DeviceConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// A broker connection.
#[derive(Debug, Deserialize)]
pub struct BrokerConfig {
    pub name: String,
}

/// A garage controller registered in the host.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    /// Topic segment the controller publishes under.
    pub address: String,
    /// Name of the broker the controller is reached through.
    pub broker: String,
    /// Overrides the default known state names.
    #[serde(default)]
    pub known_states: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from `ratgdo.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("ratgdo.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RATGDO_NAMESPACE") {
            self.bridge.namespace = val;
        }
        if let Ok(val) = std::env::var("RATGDO_PUMP_BUDGET") {
            if let Ok(budget) = val.parse() {
                self.bridge.pump_budget = budget;
            }
        }
        if let Ok(val) = std::env::var("RATGDO_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.pump_budget == 0 {
            return Err(ConfigError::Validation(
                "pump_budget must be non-zero".to_string(),
            ));
        }
        if self.bridge.namespace.is_empty() || self.bridge.message_type.is_empty() {
            return Err(ConfigError::Validation(
                "namespace and message_type must not be empty".to_string(),
            ));
        }

        let mut brokers = HashSet::new();
        for broker in &self.brokers {
            if !brokers.insert(broker.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "broker {:?} declared twice",
                    broker.name
                )));
            }
        }
        for device in &self.devices {
            if !brokers.contains(device.broker.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "device {:?} uses undeclared broker {:?}",
                    device.name, device.broker
                )));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ratgdod=info,ratgdo_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
