//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Refused to overwrite an existing file (for init command).
    #[error("Config file '{}' already exists", path.display())]
    FileExists {
        /// Path to the existing file
        path: PathBuf,
    },

    /// The same site name is registered twice.
    #[error("Jira site '{0}' is configured more than once")]
    DuplicateSite(String),

    /// Invalid stage-to-environment regex.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The invalid pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// The stage regex lacks the environment name group.
    #[error("Regex pattern '{pattern}' has no named group '{group}'")]
    MissingCaptureGroup {
        /// The pattern
        pattern: String,
        /// Required group name
        group: &'static str,
    },

    /// Invalid duration value (zero or too large).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid retry configuration.
    #[error("Invalid retry configuration: {0}")]
    InvalidRetry(String),

    /// Invalid rate limit configuration.
    #[error("Invalid rate limit configuration: {0}")]
    InvalidRateLimit(String),
}
