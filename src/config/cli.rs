//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::notify::EnvironmentType;

/// Payload path meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// jira-notify: send build and deployment events to Jira
///
/// Reads a JSON payload, signs it with the site's shared secret, and posts
/// it to the site's webhook.
#[derive(Debug, Parser)]
#[command(name = "jira-notify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Jira site to notify; required when several sites are configured
    #[arg(long, global = true)]
    pub site: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Connect timeout in seconds
    #[arg(long = "connect-timeout", global = true)]
    pub connect_timeout: Option<u64>,

    /// Maximum number of delivery attempts
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Initial retry delay in seconds
    #[arg(long = "retry-delay", global = true)]
    pub retry_delay: Option<u64>,

    /// Log the request without sending it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for jira-notify
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send build information
    Build {
        /// JSON payload file, or '-' for stdin
        #[arg(long, short, default_value = STDIN_PATH)]
        payload: PathBuf,
    },

    /// Send deployment information
    Deployment {
        /// JSON payload file, or '-' for stdin
        #[arg(long, short, default_value = STDIN_PATH)]
        payload: PathBuf,

        /// Environment name to set on the payload
        #[arg(long, group = "environment_source", conflicts_with = "stage")]
        environment: Option<String>,

        /// Environment category (default: unmapped)
        #[arg(long = "environment-type", value_enum, requires = "environment_source")]
        environment_type: Option<EnvironmentTypeArg>,

        /// Stage name to derive the environment from
        #[arg(long, group = "environment_source")]
        stage: Option<String>,
    },

    /// List configured Jira sites
    Sites,

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "jira-notify.toml")]
        output: PathBuf,
    },
}

/// Environment type argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentTypeArg {
    /// Not mapped to a category
    Unmapped,
    /// Development
    Development,
    /// Testing
    Testing,
    /// Staging
    Staging,
    /// Production
    Production,
}

impl From<EnvironmentTypeArg> for EnvironmentType {
    fn from(arg: EnvironmentTypeArg) -> Self {
        match arg {
            EnvironmentTypeArg::Unmapped => Self::Unmapped,
            EnvironmentTypeArg::Development => Self::Development,
            EnvironmentTypeArg::Testing => Self::Testing,
            EnvironmentTypeArg::Staging => Self::Staging,
            EnvironmentTypeArg::Production => Self::Production,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}

/// Returns true if `path` means standard input.
#[must_use]
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}
