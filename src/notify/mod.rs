//! Build and deployment notifications.
//!
//! This module provides:
//! - The step-level [`Notifier`]
//! - Jira reply types ([`BuildApiResponse`], [`DeploymentApiResponse`])
//! - The reported outcome ([`SendInfoResponse`], [`SendStatus`])
//! - Deployment environment helpers ([`environment_from_stage`], [`apply_environment`])

mod environment;
mod notifier;
mod response;


pub use environment::{
    DEFAULT_STAGE_PATTERN, DeploymentEnvironment, ENV_NAME_GROUP, EnvironmentType,
    apply_environment, environment_from_stage,
};
pub use notifier::Notifier;
pub use response::{
    Acceptance, BuildApiResponse, DeploymentApiResponse, EventKind, SendInfoResponse, SendStatus,
};
