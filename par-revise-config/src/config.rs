//! Rewrite engine configuration management.
//!
//! This module provides configuration loading, saving, and default values
//! for the selection rewriting engine.

use crate::error::ConfigError;
use crate::types::LogLevel;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Substitute `${VAR_NAME}` patterns in a string with environment variable values.
///
/// - `${VAR}` is replaced with the value of the environment variable `VAR`.
/// - If the variable is not set, the `${VAR}` placeholder is left unchanged.
/// - `$${VAR}` (doubled dollar sign) is an escape and produces the literal `${VAR}`.
/// - Supports `${VAR:-default}` syntax for providing a default value when the variable is unset.
///
/// This is applied to the raw YAML config string before deserialization, so all
/// string-typed config values benefit from substitution.
pub fn substitute_variables(input: &str) -> String {
    // First, replace escaped `$${` with a placeholder that won't match the regex
    let escaped_placeholder = "\x00ESC_DOLLAR\x00";
    let working = input.replace("$${", escaped_placeholder);

    // Match ${VAR_NAME} or ${VAR_NAME:-default_value}
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-((?:[^}\\]|\\.)*))?}")
        .expect("invalid regex");

    let result = re.replace_all(&working, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match std::env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                // Use default value if provided, otherwise leave the placeholder as-is
                caps.get(2)
                    .map(|m| m.as_str().replace("\\}", "}"))
                    .unwrap_or_else(|| caps[0].to_string())
            }
        }
    });

    // Restore escaped dollar signs
    result.replace(escaped_placeholder, "${")
}

/// Configuration for the selection rewriting engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    // ========================================================================
    // External transform command
    // ========================================================================
    /// Command invoked to transform the selection. The captured text is
    /// written to the command's stdin and the instruction is appended as the
    /// final argument.
    #[serde(default = "crate::defaults::command")]
    pub command: String,

    /// Extra arguments placed before the instruction argument.
    #[serde(default = "crate::defaults::args")]
    pub args: Vec<String>,

    /// Deadline for the external command in milliseconds. Must be > 0.
    #[serde(default = "crate::defaults::timeout_ms")]
    pub timeout_ms: u64,

    // ========================================================================
    // Edit behaviour
    // ========================================================================
    /// Group each replacement into a single undo entry.
    #[serde(default = "crate::defaults::preserve_undo")]
    pub preserve_undo: bool,

    /// Re-derive replacement indentation from the original selection.
    #[serde(default = "crate::defaults::reindent")]
    pub reindent: bool,

    /// Run the formatter collaborator over the replaced range after an edit.
    #[serde(default = "crate::defaults::format_after")]
    pub format_after: bool,

    /// Persist the buffer after an edit.
    #[serde(default = "crate::defaults::save_after")]
    pub save_after: bool,

    // ========================================================================
    // Logging
    // ========================================================================
    /// Verbosity written to the debug log.
    #[serde(default = "crate::defaults::log_level")]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: crate::defaults::command(),
            args: crate::defaults::args(),
            timeout_ms: crate::defaults::timeout_ms(),
            preserve_undo: crate::defaults::preserve_undo(),
            reindent: crate::defaults::reindent(),
            format_after: crate::defaults::format_after(),
            save_after: crate::defaults::save_after(),
            log_level: crate::defaults::log_level(),
        }
    }
}

impl Config {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration from disk, creating a default config file if
    /// none exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save() {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Load the configuration from an explicit path.
    ///
    /// Environment variable substitution is applied to the raw file contents
    /// before parsing, and the result is validated.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let contents = substitute_variables(&contents);
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to the default path as YAML.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(ConfigError::Parse)?;
        fs::write(&config_path, yaml).map_err(ConfigError::Io)?;
        log::info!("Config saved to {:?}", config_path);
        Ok(())
    }

    /// Check semantic constraints that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "command must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding the config file.
    pub fn config_dir() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("par-revise")
        } else {
            PathBuf::from(".")
        }
    }

    /// Full path of the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }
}
