//! Jira site registry and credential lookup.
//!
//! Callers pick a destination with [`select_site`] and fetch its shared
//! secret from a [`CredentialStore`] before handing both to the
//! [`WebhookClient`](crate::webhook::WebhookClient).

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use url::Url;


/// One registered Jira site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name, e.g. `example.atlassian.net`
    pub site: String,

    /// Webhook endpoint of the Jira app on that site
    pub webhook_url: Url,

    /// Id of the shared secret; unsigned delivery when absent
    #[serde(default)]
    pub credentials_id: Option<String>,
}

impl fmt::Display for SiteConfig {
    /// Shows the site and its endpoint host, never the credential id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.site,
            self.webhook_url.host_str().unwrap_or("?"),
            if self.credentials_id.is_some() {
                "signed"
            } else {
                "unsigned"
            }
        )
    }
}

/// Source of candidate sites.
pub trait SiteResolver: Send + Sync {
    /// Returns the sites matching `site`, or every site when `site` is `None`.
    fn resolve(&self, site: Option<&str>) -> Vec<SiteConfig>;
}

/// Site selection failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    /// The named site is not registered.
    #[error("No config found for Jira site '{0}'")]
    NotFound(String),

    /// No sites are registered at all.
    #[error("No Jira site is configured")]
    NoneConfigured,

    /// Several sites are registered and none was named.
    #[error("{count} Jira sites are configured; specify which one to use")]
    Ambiguous {
        /// Number of registered sites
        count: usize,
    },
}

/// Selects exactly one site.
///
/// # Errors
///
/// Returns [`SiteError::NotFound`] for an unknown name, and
/// [`SiteError::NoneConfigured`] or [`SiteError::Ambiguous`] when no name is
/// given and the registry does not hold exactly one site.
pub fn select_site<R: SiteResolver + ?Sized>(
    resolver: &R,
    site: Option<&str>,
) -> Result<SiteConfig, SiteError> {
    let mut candidates = resolver.resolve(site);

    match (site, candidates.len()) {
        (_, 1) => Ok(candidates.remove(0)),
        (Some(name), 0) => Err(SiteError::NotFound(name.to_string())),
        (None, 0) => Err(SiteError::NoneConfigured),
        (_, count) => Err(SiteError::Ambiguous { count }),
    }
}

/// Config-backed [`SiteResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteRegistry {
    sites: Vec<SiteConfig>,
}

impl SiteRegistry {
    /// Creates a registry from configured sites.
    #[must_use]
    pub const fn new(sites: Vec<SiteConfig>) -> Self {
        Self { sites }
    }

    /// Returns all registered sites.
    #[must_use]
    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    /// Returns true if no sites are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl SiteResolver for SiteRegistry {
    fn resolve(&self, site: Option<&str>) -> Vec<SiteConfig> {
        match site {
            Some(name) => self
                .sites
                .iter()
                .find(|s| s.site == name)
                .cloned()
                .into_iter()
                .collect(),
            None => self.sites.clone(),
        }
    }
}

/// Source of shared secrets.
pub trait CredentialStore: Send + Sync {
    /// Returns the secret stored under `credentials_id`, if any.
    fn secret(&self, credentials_id: &str) -> Option<String>;
}

/// Secrets from the config file, falling back to the process environment.
///
/// An inline entry wins over an environment variable with the same name.
/// Empty values count as missing.
#[derive(Clone, Default)]
pub struct Credentials {
    inline: HashMap<String, String>,
    use_env: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.inline.keys().collect();
        ids.sort();
        f.debug_struct("Credentials")
            .field("inline_ids", &ids)
            .field("use_env", &self.use_env)
            .finish()
    }
}

impl Credentials {
    /// Creates a store over inline secrets with environment fallback.
    #[must_use]
    pub const fn new(inline: HashMap<String, String>) -> Self {
        Self {
            inline,
            use_env: true,
        }
    }

    /// Disables the environment fallback.
    #[must_use]
    pub const fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }
}

impl CredentialStore for Credentials {
    fn secret(&self, credentials_id: &str) -> Option<String> {
        self.inline
            .get(credentials_id)
            .cloned()
            .or_else(|| {
                self.use_env
                    .then(|| std::env::var(credentials_id).ok())
                    .flatten()
            })
            .filter(|secret| !secret.is_empty())
    }
}
