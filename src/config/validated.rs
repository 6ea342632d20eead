//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

use crate::notify::{DEFAULT_STAGE_PATTERN, ENV_NAME_GROUP};
use crate::site::{Credentials, SiteConfig, SiteRegistry};
use crate::webhook::{GovernorRateLimit, RetryPolicy};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Outbound rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Sustained requests per minute
    pub requests_per_minute: NonZeroU32,
    /// Requests allowed at once
    pub burst: NonZeroU32,
}

impl RateLimitSettings {
    /// Builds the limiter.
    #[must_use]
    pub fn limiter(&self) -> GovernorRateLimit {
        GovernorRateLimit::per_minute(self.requests_per_minute, self.burst)
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// File the TOML config was read from, if any
    pub config_path: Option<PathBuf>,

    /// Registered Jira sites
    pub sites: SiteRegistry,

    /// Shared secret lookup
    pub credentials: Credentials,

    /// Site named on the command line
    pub site: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Outbound rate limit; `None` means unlimited
    pub rate_limit: Option<RateLimitSettings>,

    /// Redelivery policy
    pub retry_policy: RetryPolicy,

    /// Stage-to-environment regex
    pub stage_pattern: Regex,

    /// Dry-run mode (log requests without sending them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config_path = self
            .config_path
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());
        let rate_limit = self.rate_limit.map_or_else(
            || "unlimited".to_string(),
            |r| format!("{}/min burst {}", r.requests_per_minute, r.burst),
        );

        write!(
            f,
            "Config {{ file: {}, sites: {}, timeout: {}s, connect_timeout: {}s, \
             rate_limit: {}, retry: {}x/{}s, dry_run: {} }}",
            config_path,
            self.sites.sites().len(),
            self.timeout.as_secs(),
            self.connect_timeout.as_secs(),
            rate_limit,
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_secs(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A site name is registered twice
    /// - A timeout is zero
    /// - Rate limit or retry values are out of range
    /// - The stage regex is invalid or lacks the `envName` group
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let sites = Self::build_sites(toml)?;

        let credentials = Credentials::new(toml.map(|t| t.credentials.clone()).unwrap_or_default());

        let timeout = resolve_secs(
            "timeout",
            cli.timeout,
            toml.and_then(|t| t.http.timeout),
            defaults::TIMEOUT_SECS,
        )?;

        let connect_timeout = resolve_secs(
            "connect_timeout",
            cli.connect_timeout,
            toml.and_then(|t| t.http.connect_timeout),
            defaults::CONNECT_TIMEOUT_SECS,
        )?;

        let rate_limit = Self::build_rate_limit(toml)?;

        let retry_policy = Self::build_retry_policy(cli, toml)?;

        let stage_pattern = Self::build_stage_pattern(toml)?;

        Ok(Self {
            config_path: None,
            sites,
            credentials,
            site: cli.site.clone(),
            timeout,
            connect_timeout,
            rate_limit,
            retry_policy,
            stage_pattern,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// Reads `cli.config` when set. Otherwise reads the per-user config file
    /// if it exists, and runs on defaults alone if it does not.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(|| defaults::config_path().filter(|p| p.is_file()));

        let toml = path.as_deref().map(TomlConfig::load).transpose()?;

        let mut config = Self::from_raw(cli, toml.as_ref())?;
        config.config_path = path;
        Ok(config)
    }

    fn build_sites(toml: Option<&TomlConfig>) -> Result<SiteRegistry, ConfigError> {
        let sites: Vec<SiteConfig> = toml.map(|t| t.sites.clone()).unwrap_or_default();

        let mut seen = HashSet::new();
        for site in &sites {
            if !seen.insert(site.site.as_str()) {
                return Err(ConfigError::DuplicateSite(site.site.clone()));
            }
        }

        Ok(SiteRegistry::new(sites))
    }

    fn build_rate_limit(toml: Option<&TomlConfig>) -> Result<Option<RateLimitSettings>, ConfigError> {
        let Some(section) = toml.map(|t| &t.rate_limit) else {
            return Ok(None);
        };

        let Some(rpm) = section.requests_per_minute else {
            if section.burst.is_some() {
                return Err(ConfigError::InvalidRateLimit(
                    "burst requires requests_per_minute".to_string(),
                ));
            }
            return Ok(None);
        };

        let requests_per_minute = NonZeroU32::new(rpm).ok_or_else(|| {
            ConfigError::InvalidRateLimit("requests_per_minute must be greater than 0".to_string())
        })?;

        let burst = match section.burst {
            Some(b) => NonZeroU32::new(b).ok_or_else(|| {
                ConfigError::InvalidRateLimit("burst must be greater than 0".to_string())
            })?,
            None => requests_per_minute,
        };

        Ok(Some(RateLimitSettings {
            requests_per_minute,
            burst,
        }))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_secs = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.initial_delay))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_SECS);

        let max_delay_secs = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_SECS);

        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if initial_delay_secs == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_secs < initial_delay_secs {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_secs}s) must be >= initial_delay ({initial_delay_secs}s)"
            )));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_secs(initial_delay_secs))
            .with_max_delay(Duration::from_secs(max_delay_secs))
            .with_multiplier(multiplier))
    }

    fn build_stage_pattern(toml: Option<&TomlConfig>) -> Result<Regex, ConfigError> {
        let pattern = toml
            .and_then(|t| t.auto_deployments.regex.as_deref())
            .unwrap_or(DEFAULT_STAGE_PATTERN);

        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;

        if !regex.capture_names().flatten().any(|name| name == ENV_NAME_GROUP) {
            return Err(ConfigError::MissingCaptureGroup {
                pattern: pattern.to_string(),
                group: ENV_NAME_GROUP,
            });
        }

        Ok(regex)
    }
}

/// Writes the default configuration template to a file.
///
/// Parent directories are created as needed. An existing file is left alone.
///
/// # Errors
///
/// Returns an error if the file exists or cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::FileExists {
            path: path.to_path_buf(),
        });
    }

    let write_err = |e: std::io::Error| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(write_err)
}

/// Priority: CLI explicit > TOML > default. Zero is rejected.
fn resolve_secs(
    field: &'static str,
    cli: Option<u64>,
    toml: Option<u64>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let seconds = cli.or(toml).unwrap_or(default);

    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}
