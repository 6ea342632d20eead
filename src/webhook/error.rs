//! Error types for webhook delivery.

use std::fmt;

use thiserror::Error;

/// Boxed error cause carried by [`DeliveryError`] and [`HttpError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for the transport seam ([`HttpClient`]).
///
/// Describes what went wrong on the wire. [`WebhookClient`] folds all of these
/// into [`ErrorKind::TransportFailure`].
///
/// [`HttpClient`]: super::HttpClient
/// [`WebhookClient`]: super::WebhookClient
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, refused connections,
    /// and errors while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built for the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Classification of a failed delivery.
///
/// The set is closed: every failure of [`WebhookClient`] maps to exactly one kind.
///
/// [`WebhookClient`]: super::WebhookClient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The payload could not be serialized to JSON.
    InvalidPayload,
    /// Network, connection or timeout error during the HTTP call.
    TransportFailure,
    /// The response status was outside the 2xx range.
    ServerError,
    /// Success status but no response body.
    EmptyResponse,
    /// The response body could not be decoded into the requested shape.
    DecodeFailure,
    /// A composed rate limiter denied the call before it was sent.
    RateLimited,
    /// Token construction failed.
    SigningFailure,
}

impl ErrorKind {
    /// Returns a stable identifier for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPayload => "invalid_payload",
            Self::TransportFailure => "transport_failure",
            Self::ServerError => "server_error",
            Self::EmptyResponse => "empty_response",
            Self::DecodeFailure => "decode_failure",
            Self::RateLimited => "rate_limited",
            Self::SigningFailure => "signing_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`WebhookClient`] operations.
///
/// Carries a [`ErrorKind`], a human-readable message and, where one exists,
/// the underlying cause (available through [`std::error::Error::source`]).
///
/// [`WebhookClient`]: super::WebhookClient
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DeliveryError {
    kind: ErrorKind,
    message: String,
    status: Option<http::StatusCode>,
    #[source]
    source: Option<BoxError>,
}

impl DeliveryError {
    /// Creates an error of the given kind without a cause.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn invalid_payload(source: serde_json::Error) -> Self {
        Self::new(
            ErrorKind::InvalidPayload,
            format!("Unable to create the request payload: {source}"),
        )
        .with_source(source)
    }

    pub(crate) fn transport(source: HttpError) -> Self {
        Self::new(
            ErrorKind::TransportFailure,
            format!("Server exception when submitting update to Jira: {source}"),
        )
        .with_source(source)
    }

    pub(crate) fn server_error(status: http::StatusCode) -> Self {
        let mut err = Self::new(
            ErrorKind::ServerError,
            format!(
                "Error response code {} when submitting update to Jira",
                status.as_u16()
            ),
        );
        err.status = Some(status);
        err
    }

    pub(crate) fn empty_response() -> Self {
        Self::new(
            ErrorKind::EmptyResponse,
            "Empty response body when submitting update to Jira",
        )
    }

    pub(crate) fn decode(source: serde_json::Error) -> Self {
        Self::new(
            ErrorKind::DecodeFailure,
            format!("Unable to decode the response from Jira: {source}"),
        )
        .with_source(source)
    }

    pub(crate) fn rate_limited(source: super::RateLimitExceeded) -> Self {
        Self::new(ErrorKind::RateLimited, format!("Rate limit reached: {source}"))
            .with_source(source)
    }

    pub(crate) fn signing(message: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::SigningFailure,
            format!("Unable to sign the request payload: {message}"),
        )
    }

    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status for [`ErrorKind::ServerError`] failures.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        self.status
    }

    /// Returns true if the failure may succeed on a later attempt.
    ///
    /// Transport failures are transient. Of the HTTP failures only 5xx,
    /// 429 (Too Many Requests) and 408 (Request Timeout) are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::TransportFailure => true,
            ErrorKind::ServerError => self.status.is_some_and(|status| {
                status.is_server_error()
                    || status == http::StatusCode::TOO_MANY_REQUESTS
                    || status == http::StatusCode::REQUEST_TIMEOUT
            }),
            ErrorKind::InvalidPayload
            | ErrorKind::EmptyResponse
            | ErrorKind::DecodeFailure
            | ErrorKind::RateLimited
            | ErrorKind::SigningFailure => false,
        }
    }
}
