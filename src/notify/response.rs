//! Jira API replies and the step-level result.

use std::fmt;

use serde::Deserialize;

/// Kind of event delivered to Jira.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// CI build result
    Build,
    /// Deployment to an environment
    Deployment,
}

impl EventKind {
    /// Name of the pipeline step reporting this kind of event.
    #[must_use]
    pub const fn step_name(self) -> &'static str {
        match self {
            Self::Build => "jiraSendBuildInfo",
            Self::Deployment => "jiraSendDeploymentInfo",
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Deployment => "deployment",
        }
    }
}

/// What Jira did with the submitted entities.
///
/// Item contents are left as raw JSON.
pub trait Acceptance {
    /// Entities Jira stored.
    fn accepted(&self) -> &[serde_json::Value];
    /// Entities Jira refused, with their errors.
    fn rejected(&self) -> &[serde_json::Value];
    /// Issue keys Jira could not find.
    fn unknown_issue_keys(&self) -> &[String];
}

/// Reply to a build submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildApiResponse {
    /// Accepted builds
    pub accepted_builds: Vec<serde_json::Value>,
    /// Rejected builds
    pub rejected_builds: Vec<serde_json::Value>,
    /// Unknown issue keys
    pub unknown_issue_keys: Vec<String>,
}

impl Acceptance for BuildApiResponse {
    fn accepted(&self) -> &[serde_json::Value] {
        &self.accepted_builds
    }

    fn rejected(&self) -> &[serde_json::Value] {
        &self.rejected_builds
    }

    fn unknown_issue_keys(&self) -> &[String] {
        &self.unknown_issue_keys
    }
}

/// Reply to a deployment submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentApiResponse {
    /// Accepted deployments
    pub accepted_deployments: Vec<serde_json::Value>,
    /// Rejected deployments
    pub rejected_deployments: Vec<serde_json::Value>,
    /// Unknown issue keys
    pub unknown_issue_keys: Vec<String>,
}

impl Acceptance for DeploymentApiResponse {
    fn accepted(&self) -> &[serde_json::Value] {
        &self.accepted_deployments
    }

    fn rejected(&self) -> &[serde_json::Value] {
        &self.rejected_deployments
    }

    fn unknown_issue_keys(&self) -> &[String] {
        &self.unknown_issue_keys
    }
}

/// Outcome of one notification, as reported to the build log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Jira accepted the build.
    SuccessBuildAccepted,
    /// Jira accepted the deployment.
    SuccessDeploymentAccepted,
    /// Jira rejected the build.
    FailureBuildRejected,
    /// Jira rejected the deployment.
    FailureDeploymentRejected,
    /// Nothing was rejected but some issue keys were unknown.
    FailureUnknownIssueKeys,
    /// The build delivery failed.
    FailureBuildsApiResponse,
    /// The deployment delivery failed.
    FailureDeploymentsApiResponse,
    /// The named site is not configured.
    FailureSiteConfigNotFound,
    /// No site is configured.
    FailureNoSiteConfigPresent,
    /// Several sites are configured and none was named.
    FailureMultipleSiteConfigsPresent,
    /// The site's shared secret could not be found.
    FailureSecretNotFound,
}

impl SendStatus {
    /// Returns the log identifier, e.g. `SUCCESS_BUILD_ACCEPTED`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuccessBuildAccepted => "SUCCESS_BUILD_ACCEPTED",
            Self::SuccessDeploymentAccepted => "SUCCESS_DEPLOYMENT_ACCEPTED",
            Self::FailureBuildRejected => "FAILURE_BUILD_REJECTED",
            Self::FailureDeploymentRejected => "FAILURE_DEPLOYMENT_REJECTED",
            Self::FailureUnknownIssueKeys => "FAILURE_UNKNOWN_ISSUE_KEYS",
            Self::FailureBuildsApiResponse => "FAILURE_BUILDS_API_RESPONSE",
            Self::FailureDeploymentsApiResponse => "FAILURE_DEPLOYMENTS_API_RESPONSE",
            Self::FailureSiteConfigNotFound => "FAILURE_SITE_CONFIG_NOT_FOUND",
            Self::FailureNoSiteConfigPresent => "FAILURE_NO_SITE_CONFIG_PRESENT",
            Self::FailureMultipleSiteConfigsPresent => "FAILURE_MULTIPLE_SITE_CONFIGS_PRESENT",
            Self::FailureSecretNotFound => "FAILURE_SECRET_NOT_FOUND",
        }
    }

    /// Returns true for the `SUCCESS_*` statuses.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(
            self,
            Self::SuccessBuildAccepted | Self::SuccessDeploymentAccepted
        )
    }

    pub(crate) const fn accepted(kind: EventKind) -> Self {
        match kind {
            EventKind::Build => Self::SuccessBuildAccepted,
            EventKind::Deployment => Self::SuccessDeploymentAccepted,
        }
    }

    pub(crate) const fn rejected(kind: EventKind) -> Self {
        match kind {
            EventKind::Build => Self::FailureBuildRejected,
            EventKind::Deployment => Self::FailureDeploymentRejected,
        }
    }

    pub(crate) const fn api_failure(kind: EventKind) -> Self {
        match kind {
            EventKind::Build => Self::FailureBuildsApiResponse,
            EventKind::Deployment => Self::FailureDeploymentsApiResponse,
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInfoResponse {
    /// Site the event was sent to, when one was selected
    pub site: Option<String>,
    /// Outcome
    pub status: SendStatus,
    /// Human-readable detail
    pub message: String,
}

impl SendInfoResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(site: Option<&str>, status: SendStatus, message: impl Into<String>) -> Self {
        Self {
            site: site.map(ToString::to_string),
            status,
            message: message.into(),
        }
    }

    /// Classifies a decoded Jira reply.
    ///
    /// Rejections take precedence over unknown issue keys.
    #[must_use]
    pub fn from_reply<R: Acceptance>(kind: EventKind, site: &str, reply: &R) -> Self {
        let rejected = reply.rejected();
        if !rejected.is_empty() {
            return Self::new(
                Some(site),
                SendStatus::rejected(kind),
                format!(
                    "The {} was rejected by Jira site '{site}': {}",
                    kind.noun(),
                    rejection_errors(rejected)
                ),
            );
        }

        let unknown = reply.unknown_issue_keys();
        if !unknown.is_empty() {
            return Self::new(
                Some(site),
                SendStatus::FailureUnknownIssueKeys,
                format!(
                    "Jira site '{site}' does not know the issue keys: {}",
                    unknown.join(", ")
                ),
            );
        }

        Self::new(
            Some(site),
            SendStatus::accepted(kind),
            format!(
                "{} {}(s) accepted by Jira site '{site}'",
                reply.accepted().len(),
                kind.noun()
            ),
        )
    }

    /// Returns true if Jira accepted the event.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl fmt::Display for SendInfoResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

/// Collects `errors[].message` from rejected items, or their count when none
/// carry messages.
fn rejection_errors(rejected: &[serde_json::Value]) -> String {
    let messages: Vec<&str> = rejected
        .iter()
        .filter_map(|item| item.get("errors").and_then(serde_json::Value::as_array))
        .flatten()
        .filter_map(|error| error.get("message").and_then(serde_json::Value::as_str))
        .collect();

    if messages.is_empty() {
        format!("{} item(s) rejected", rejected.len())
    } else {
        messages.join("; ")
    }
}
