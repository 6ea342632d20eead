//! Application execution logic.
//!
//! This module reads the payload, prepares it for the chosen event kind,
//! and hands it to the [`Notifier`].

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use jira_notify::config::{Command, EnvironmentTypeArg, ValidatedConfig, is_stdin};
use jira_notify::notify::{
    DeploymentEnvironment, EventKind, Notifier, SendStatus, apply_environment,
    environment_from_stage,
};
use jira_notify::site::{CredentialStore, SiteRegistry, select_site};
use jira_notify::webhook::{
    HttpError, RateLimit, ReqwestClient, Unlimited, WebhookClient, serialize_payload,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to read the payload.
    #[error("Failed to read payload from {origin}: {source}")]
    PayloadRead {
        /// File path or `stdin`
        origin: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The payload is not valid JSON.
    #[error("Payload is not valid JSON: {0}")]
    PayloadParse(#[source] serde_json::Error),

    /// An environment was requested for a payload that is not a JSON object.
    #[error("Cannot set the environment on a payload that is not a JSON object")]
    PayloadNotObject,

    /// The stage name does not yield an environment.
    #[error("Stage '{0}' does not match the deployment environment pattern")]
    StageNotMatched(String),

    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] HttpError),

    /// Jira did not accept the event.
    #[error("Notification failed with {0}")]
    NotificationFailed(SendStatus),
}

/// Environment options of the `deployment` command.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EnvironmentOptions {
    name: Option<String>,
    env_type: EnvironmentTypeArg,
    stage: Option<String>,
}

/// Executes one command.
///
/// # Errors
///
/// Returns an error if the payload cannot be prepared or Jira does not
/// accept the event.
pub async fn execute(command: Command, config: ValidatedConfig) -> Result<(), RunError> {
    match command {
        Command::Build { payload } => {
            let payload = read_payload(&payload).await?;
            notify(EventKind::Build, payload, config).await
        }
        Command::Deployment {
            payload,
            environment,
            environment_type,
            stage,
        } => {
            let mut payload = read_payload(&payload).await?;
            let options = EnvironmentOptions {
                name: environment,
                env_type: environment_type.unwrap_or(EnvironmentTypeArg::Unmapped),
                stage,
            };
            if let Some(env) = resolve_environment(&options, &config.stage_pattern)? {
                tracing::debug!("Deployment environment: {} ({:?})", env.id, env.env_type);
                if !apply_environment(&mut payload, &env) {
                    return Err(RunError::PayloadNotObject);
                }
            }
            notify(EventKind::Deployment, payload, config).await
        }
        Command::Sites => {
            for line in site_lines(&config.sites) {
                println!("{line}");
            }
            Ok(())
        }
        // Handled before the configuration is loaded.
        Command::Init { .. } => Ok(()),
    }
}

async fn notify(kind: EventKind, payload: Value, config: ValidatedConfig) -> Result<(), RunError> {
    if config.dry_run {
        dry_run(kind, &payload, &config);
        return Ok(());
    }

    let http = ReqwestClient::with_timeouts(config.timeout, config.connect_timeout)
        .map_err(RunError::ClientBuild)?;

    let limiter: Arc<dyn RateLimit> = match config.rate_limit {
        Some(settings) => {
            tracing::debug!(
                "Rate limit: {}/min, burst {}",
                settings.requests_per_minute,
                settings.burst
            );
            Arc::new(settings.limiter())
        }
        None => Arc::new(Unlimited),
    };

    let client = WebhookClient::new(http).with_rate_limit(limiter);
    let notifier = Notifier::new(client, config.sites, config.credentials)
        .with_retry_policy(config.retry_policy);

    let response = match kind {
        EventKind::Build => notifier.send_build(config.site.as_deref(), &payload).await,
        EventKind::Deployment => {
            notifier
                .send_deployment(config.site.as_deref(), &payload)
                .await
        }
    };

    println!("{response}");

    if response.is_success() {
        Ok(())
    } else {
        Err(RunError::NotificationFailed(response.status))
    }
}

/// Logs what would be sent, without touching the network.
fn dry_run(kind: EventKind, payload: &Value, config: &ValidatedConfig) {
    let target = match select_site(&config.sites, config.site.as_deref()) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Dry-run: {}: {e}", kind.step_name());
            return;
        }
    };

    let body = match serialize_payload(payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Dry-run: {}: {e}", kind.step_name());
            return;
        }
    };

    match target.credentials_id.as_deref() {
        Some(id) if config.credentials.secret(id).is_none() => {
            tracing::warn!("Dry-run: no secret found for credentials id '{id}'");
        }
        Some(id) => tracing::info!("Dry-run: would sign with credentials '{id}'"),
        None => tracing::info!("Dry-run: would send unsigned"),
    }

    tracing::info!(
        "Dry-run: {} would POST to {}: {body}",
        kind.step_name(),
        target.webhook_url
    );
}

/// Reads and parses the JSON payload from a file or stdin.
async fn read_payload(path: &Path) -> Result<Value, RunError> {
    let bytes = if is_stdin(path) {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .map_err(|e| RunError::PayloadRead {
                origin: "stdin".to_string(),
                source: e,
            })?;
        buf
    } else {
        tokio::fs::read(path)
            .await
            .map_err(|e| RunError::PayloadRead {
                origin: path.display().to_string(),
                source: e,
            })?
    };

    parse_payload(&bytes)
}

fn parse_payload(bytes: &[u8]) -> Result<Value, RunError> {
    serde_json::from_slice(bytes).map_err(RunError::PayloadParse)
}

/// Picks the deployment environment from `--environment`, else from `--stage`.
fn resolve_environment(
    options: &EnvironmentOptions,
    pattern: &Regex,
) -> Result<Option<DeploymentEnvironment>, RunError> {
    let name = match (&options.name, &options.stage) {
        (Some(name), _) => name.clone(),
        (None, Some(stage)) => environment_from_stage(pattern, stage)
            .ok_or_else(|| RunError::StageNotMatched(stage.clone()))?,
        (None, None) => return Ok(None),
    };

    Ok(Some(DeploymentEnvironment::named(
        name,
        options.env_type.into(),
    )))
}

fn site_lines(sites: &SiteRegistry) -> Vec<String> {
    if sites.is_empty() {
        return vec!["No Jira sites configured".to_string()];
    }
    sites.sites().iter().map(ToString::to_string).collect()
}
