use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::local_records::LocalRecord;
use super::logging::LoggingConfig;
use super::lookup::{DispatchMode, LookupConfig, MAX_TIMEOUT_MS};
use super::memory::MemoryConfig;

/// Main configuration structure for Ferrous Lookup
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub local_records: Vec<LocalRecord>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-lookup.toml in current directory
    /// 3. /etc/ferrous-lookup/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-lookup.toml").exists() {
            Self::from_file("ferrous-lookup.toml")?
        } else if std::path::Path::new("/etc/ferrous-lookup/config.toml").exists() {
            Self::from_file("/etc/ferrous-lookup/config.toml")?
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
        if let Some(timeout) = overrides.timeout_ms {
            self.lookup.timeout_ms = timeout;
        }
        if let Some(mode) = overrides.dispatch_mode {
            self.lookup.dispatch_mode = mode;
        }
        if let Some(both) = overrides.return_both_v4_and_v6 {
            self.lookup.return_both_v4_and_v6 = both;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "Lookup timeout cannot exceed {} ms",
                MAX_TIMEOUT_MS
            )));
        }

        if self.memory.budget_bytes == Some(0) {
            return Err(ConfigError::Validation(
                "Memory budget cannot be 0 bytes".to_string(),
            ));
        }

        for record in &self.local_records {
            if record.hostname.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Local record has an empty hostname".to_string(),
                ));
            }
            record.address()?;
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub timeout_ms: Option<u64>,
    pub dispatch_mode: Option<DispatchMode>,
    pub return_both_v4_and_v6: Option<bool>,
    pub log_level: Option<String>,
}
