//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default number of delivery attempts (no redelivery).
pub const RETRY_MAX_ATTEMPTS: u32 = 1;

/// Default initial retry delay in seconds.
pub const RETRY_INITIAL_DELAY_SECS: u64 = 2;

/// Default maximum retry delay in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 30;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Directory under the platform config dir holding the config file.
pub const CONFIG_DIR_NAME: &str = "jira-notify";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default connect timeout as Duration.
#[must_use]
pub const fn connect_timeout() -> Duration {
    Duration::from_secs(CONNECT_TIMEOUT_SECS)
}

/// Default initial retry delay as Duration.
#[must_use]
pub const fn retry_initial_delay() -> Duration {
    Duration::from_secs(RETRY_INITIAL_DELAY_SECS)
}

/// Default maximum retry delay as Duration.
#[must_use]
pub const fn retry_max_delay() -> Duration {
    Duration::from_secs(RETRY_MAX_DELAY_SECS)
}

/// Per-user config file location, e.g. `~/.config/jira-notify/config.toml`.
///
/// `None` when the platform has no config directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
