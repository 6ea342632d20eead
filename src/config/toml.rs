//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::site::SiteConfig;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// Every section is optional; a missing section falls back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Registered Jira sites
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Shared secrets keyed by credentials id
    #[serde(default)]
    pub credentials: HashMap<String, String>,

    /// Transport configuration
    #[serde(default)]
    pub http: HttpSection,

    /// Outbound rate limit configuration
    #[serde(default)]
    pub rate_limit: RateLimitSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,

    /// Stage-to-environment mapping
    #[serde(default)]
    pub auto_deployments: AutoDeploymentsSection,
}

/// Transport configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Connect timeout in seconds
    pub connect_timeout: Option<u64>,
}

/// Rate limit configuration section.
///
/// Limiting is off unless `requests_per_minute` is set.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    /// Sustained requests per minute
    pub requests_per_minute: Option<u32>,

    /// Requests allowed at once (default: `requests_per_minute`)
    pub burst: Option<u32>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of delivery attempts
    pub max_attempts: Option<u32>,

    /// Initial retry delay in seconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in seconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

/// Stage-to-environment mapping section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoDeploymentsSection {
    /// Regex with an `envName` group applied to `--stage`
    pub regex: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# jira-notify configuration file

# One block per Jira site.
# [[sites]]
# site = "example.atlassian.net"
# webhook_url = "https://example.atlassian.net/webhook/jenkins"
# Id of the shared secret in [credentials] or the environment.
# Omit to send unsigned JSON.
# credentials_id = "JIRA_EXAMPLE_SECRET"

[credentials]
# Shared secrets keyed by credentials id.
# An id missing here is looked up as an environment variable.
# JIRA_EXAMPLE_SECRET = "change-me"

[http]
# Request timeout in seconds (default: 30)
# timeout = 30

# Connect timeout in seconds (default: 10)
# connect_timeout = 10

[rate_limit]
# Outbound requests per minute (default: unlimited)
# requests_per_minute = 60

# Requests allowed at once (default: requests_per_minute)
# burst = 10

[retry]
# Maximum number of delivery attempts (default: 1, no redelivery)
# max_attempts = 3

# Initial retry delay in seconds (default: 2)
# initial_delay = 2

# Maximum retry delay in seconds (default: 30)
# max_delay = 30

# Backoff multiplier (default: 2.0)
# multiplier = 2.0

[auto_deployments]
# Regex deriving the environment from --stage; must define the envName group
# regex = "^deploy to (?<envName>.*)$"
"#
    .to_string()
}
