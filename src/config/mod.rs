//! Configuration layer for jira-notify.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Sites, credentials, the rate limit and the stage regex are TOML-only.
//! `retry.max_delay` and `retry.multiplier` are TOML-only as well.
//!
//! # Config file location
//!
//! `--config` wins. Without it the per-user file from
//! [`defaults::config_path`] is read when it exists.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, EnvironmentTypeArg, STDIN_PATH, is_stdin};
pub use error::ConfigError;
pub use toml::{
    AutoDeploymentsSection, HttpSection, RateLimitSection, RetrySection, TomlConfig,
    default_config_template,
};
pub use validated::{RateLimitSettings, ValidatedConfig, write_default_config};
