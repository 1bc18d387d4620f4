//! Runtime configuration loaded from TOML

use crate::molecule::BondPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default bond-length threshold in Angstroms
pub const DEFAULT_BOND_THRESHOLD: f64 = 1.6;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Unit applied to bare rotation angles in commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    /// Convert a value in this unit to radians
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Atoms closer than this (Å) are bonded by inference
    pub bond_threshold: f64,

    pub bond_policy: BondPolicy,

    pub angle_unit: AngleUnit,

    /// Prompt shown by the interactive shell
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bond_threshold: DEFAULT_BOND_THRESHOLD,
            bond_policy: BondPolicy::default(),
            angle_unit: AngleUnit::default(),
            prompt: "bondrot> ".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bond_threshold.is_finite() || self.bond_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bond_threshold must be a finite positive length, got {}",
                self.bond_threshold
            )));
        }
        Ok(())
    }
}
