//! Layout loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::LayoutConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for layout loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read layout: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed layout: {}", e),
            ConfigError::Validation(errors) => {
                let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "invalid layout ({} problems): {}", errors.len(), problems.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate a layout from TOML text.
pub fn parse_config(content: &str) -> Result<LayoutConfig, ConfigError> {
    let config: LayoutConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a layout from a TOML file.
pub fn load_config(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}
