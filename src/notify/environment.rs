//! Deployment environment helpers.

use regex::Regex;
use serde::Serialize;

/// Default pattern mapping stage names to environments.
pub const DEFAULT_STAGE_PATTERN: &str = r"^deploy to (?<envName>.*)$";

/// Capture group holding the environment name.
pub const ENV_NAME_GROUP: &str = "envName";

/// Environment category understood by Jira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    /// Not mapped to a category
    #[default]
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

/// Deployment target, serialized as Jira's `environment` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEnvironment {
    /// Stable environment id
    pub id: String,
    /// Name shown in Jira
    pub display_name: String,
    /// Category
    #[serde(rename = "type")]
    pub env_type: EnvironmentType,
}

impl DeploymentEnvironment {
    /// Creates an environment whose id and display name are both `name`.
    #[must_use]
    pub fn named(name: impl Into<String>, env_type: EnvironmentType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            display_name: name,
            env_type,
        }
    }
}

/// Extracts the environment name from a stage name.
///
/// Returns `None` when the stage does not match or the `envName` group is
/// missing or blank.
#[must_use]
pub fn environment_from_stage(pattern: &Regex, stage: &str) -> Option<String> {
    pattern
        .captures(stage)?
        .name(ENV_NAME_GROUP)
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
}

/// Sets `payload["environment"]`, replacing any previous value.
///
/// Returns false and leaves the payload untouched if it is not a JSON object.
pub fn apply_environment(payload: &mut serde_json::Value, env: &DeploymentEnvironment) -> bool {
    let Some(object) = payload.as_object_mut() else {
        return false;
    };
    let Ok(environment) = serde_json::to_value(env) else {
        return false;
    };

    object.insert("environment".to_string(), environment);
    true
}
