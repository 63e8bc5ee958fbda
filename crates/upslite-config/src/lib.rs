//! Configuration management for the UPS Lite battery indicator
//!
//! TOML-based configuration: the shutdown threshold, where the fuel gauge lives, the
//! status display geometry and the power-off command.

mod settings;

pub use settings::{DisplaySettings, GaugeSettings, PowerSettings};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/upslite";

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_ENV: &str = "UPSLITE_CONFIG";

/// Main UPS Lite configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsLiteConfig {
    /// Run the battery indicator at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Shut down once capacity drops to this percentage (0-100)
    #[serde(default = "default_shutdown")]
    pub shutdown: f32,

    /// Seconds between display updates
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub gauge: GaugeSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub power: PowerSettings,
}

fn default_enabled() -> bool {
    true
}

fn default_shutdown() -> f32 {
    2.0
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for UpsLiteConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            shutdown: default_shutdown(),
            poll_interval_secs: default_poll_interval(),
            gauge: GaugeSettings::default(),
            display: DisplaySettings::default(),
            power: PowerSettings::default(),
        }
    }
}

impl UpsLiteConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // Explicit path wins and must exist
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        let system_config = Path::new(CONFIG_DIR).join("config.toml");
        if system_config.exists() {
            return Self::load(&system_config);
        }

        // Return default config if no file exists
        tracing::warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shutdown.is_finite() || !(0.0..=100.0).contains(&self.shutdown) {
            return Err(ConfigError::Invalid(format!(
                "shutdown threshold must be between 0 and 100, got {}",
                self.shutdown
            )));
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }

        if self.gauge.address > 0x7f {
            return Err(ConfigError::Invalid(format!(
                "gauge address 0x{:x} is not a 7-bit I2C address",
                self.gauge.address
            )));
        }

        if self.power.command.is_empty() {
            return Err(ConfigError::Invalid(
                "power.command must name a program".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = UpsLiteConfig::default();
        assert!(config.enabled);
        assert_eq!(config.shutdown, 2.0);
        assert_eq!(config.poll_interval_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = UpsLiteConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: UpsLiteConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/upslite/config.toml"));
        assert!(format!("{}", err).contains("not found"));

        let err = ConfigError::Invalid("test error".to_string());
        assert!(format!("{}", err).contains("Invalid"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
shutdown = 5

[gauge]
address = 0x62
charge_pin = 17

[display]
status_file = "/run/upslite/status.json"
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = UpsLiteConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.shutdown, 5.0);
        assert_eq!(config.gauge.charge_pin, 17);
        assert_eq!(config.gauge.bus, 1);
        assert_eq!(
            config.display.status_file,
            Some(PathBuf::from("/run/upslite/status.json"))
        );
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "shutdown = 150").unwrap();

        let err = UpsLiteConfig::load(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = UpsLiteConfig {
            shutdown: -1.0,
            ..UpsLiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_bounds_inclusive() {
        for shutdown in [0.0, 100.0] {
            let config = UpsLiteConfig {
                shutdown,
                ..UpsLiteConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_missing_file() {
        let err = UpsLiteConfig::load(Path::new("/nonexistent/upslite.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_save_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = UpsLiteConfig {
            shutdown: 10.0,
            ..UpsLiteConfig::default()
        };

        config.save(&path).unwrap();

        let loaded = UpsLiteConfig::load(&path).unwrap();
        assert_eq!(loaded.shutdown, 10.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = UpsLiteConfig {
            poll_interval_secs: 0,
            ..UpsLiteConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = UpsLiteConfig::default();
        config.gauge.address = 0x100;
        assert!(config.validate().is_err());

        let mut config = UpsLiteConfig::default();
        config.power.command.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_constants() {
        assert_eq!(CONFIG_DIR, "/etc/upslite");
        assert_eq!(CONFIG_ENV, "UPSLITE_CONFIG");
    }
}
