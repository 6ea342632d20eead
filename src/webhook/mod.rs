//! Webhook delivery to Jira.
//!
//! This module provides:
//! - Request/response types and the transport seam ([`HttpRequest`], [`HttpResponse`], [`HttpClient`])
//! - The production transport ([`ReqwestClient`])
//! - The delivery client ([`WebhookClient`]) with plain and signed modes
//! - Token signing ([`TokenSigner`])
//! - Failure classification ([`DeliveryError`], [`ErrorKind`])
//! - Admission control ([`RateLimit`], [`GovernorRateLimit`])
//! - Redelivery policy for callers ([`RetryPolicy`])

mod client;
mod error;
mod http;
mod rate_limit;
mod retry;
mod sender;
pub mod token;

#[cfg(test)]
mod client_tests;

pub use client::ReqwestClient;
pub use error::{BoxError, DeliveryError, ErrorKind, HttpError};
pub use http::{HttpClient, HttpRequest, HttpResponse, JSON_CONTENT_TYPE, JWT_CONTENT_TYPE};
pub use rate_limit::{GovernorRateLimit, RateLimit, RateLimitExceeded, Unlimited};
pub use retry::RetryPolicy;
pub use sender::{WebhookClient, serialize_payload};
pub use token::{TokenSigner, WebhookClaims};
