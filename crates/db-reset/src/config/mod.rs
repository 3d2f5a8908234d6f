//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{ResetError, Result};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Schema owner used to scope the Oracle table phase.
    ///
    /// Falls back to the connection user. Errors if neither is set.
    pub fn schema_owner(&self) -> Result<String> {
        self.schema_owner
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.connection.user.trim()).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                ResetError::Config(
                    "schema_owner is required when connection.user is not set".into(),
                )
            })
    }
}
