use std::path::{Path, PathBuf};

use alloy_primitives::utils::Unit;
use serde::Deserialize;

use crate::domain::allocation::{DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::domain::merkle::DuplicatePolicy;

/// Generator configuration loaded from TOML. Every field is optional.
///
/// ```toml
/// input = "whitelist.csv"
/// output = "whitelist.json"
/// decimals = 18
/// duplicates = "reject"    # or "keep-first"
/// has_headers = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Allocation CSV to read.
    pub input: PathBuf,
    /// Where the `{merkleRoot, addresses}` JSON is written.
    pub output: PathBuf,
    /// Token decimals used to scale human-readable amounts to base units.
    pub decimals: u8,
    /// Handling of addresses listed more than once.
    pub duplicates: DuplicatePolicy,
    /// Whether the first CSV row is a header.
    pub has_headers: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("whitelist.csv"),
            output: PathBuf::from("whitelist.json"),
            decimals: DEFAULT_DECIMALS,
            duplicates: DuplicatePolicy::default(),
            has_headers: true,
        }
    }
}

/// Values given on the command line. Each one that is set replaces the
/// corresponding config field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub decimals: Option<u8>,
    /// Switches the policy to `KeepFirst`. Leaving it unset keeps the
    /// configured policy.
    pub keep_first_duplicates: bool,
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl GeneratorConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and validate the merged config.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(decimals) = overrides.decimals {
            self.decimals = decimals;
        }
        if overrides.keep_first_duplicates {
            self.duplicates = DuplicatePolicy::KeepFirst;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Unit::new(self.decimals).is_none() {
            return Err(ConfigError::Validation(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }

        if self.input == self.output {
            return Err(ConfigError::Validation(format!(
                "input and output must differ (both are {})",
                self.input.display()
            )));
        }

        Ok(())
    }
}
