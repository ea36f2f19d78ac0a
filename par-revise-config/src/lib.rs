//! Configuration system for the par-revise selection rewriting engine.
//!
//! This crate provides configuration loading, saving, and default values
//! for the rewrite engine. It includes:
//!
//! - The external transform command and its arguments
//! - Timeout, undo-grouping, and reindent behaviour
//! - Post-edit side effects (format / persist after a replacement)
//! - Environment variable substitution in the raw config file

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{Config, substitute_variables};
pub use error::ConfigError;
pub use types::LogLevel;
