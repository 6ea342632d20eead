//! Webhook delivery client.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::time::{Clock, SystemClock};

use super::http::{JSON_CONTENT_TYPE, JWT_CONTENT_TYPE};
use super::{
    DeliveryError, HttpClient, HttpRequest, HttpResponse, RateLimit, TokenSigner, Unlimited,
};

/// Serializes a payload to its canonical JSON form.
///
/// Every path that needs the wire form of a payload (unsigned body, signed
/// claim, dry-run logging) goes through this function.
///
/// # Errors
///
/// Returns an [`InvalidPayload`](super::ErrorKind::InvalidPayload) error if
/// the payload cannot be represented as JSON.
pub fn serialize_payload<P: Serialize + ?Sized>(payload: &P) -> Result<String, DeliveryError> {
    serde_json::to_string(payload).map_err(DeliveryError::invalid_payload)
}

/// Delivers requests to a Jira webhook and decodes the reply.
///
/// The client is stateless between calls: the transport, rate limiter and
/// signer are shared, nothing else is kept. It never retries.
///
/// # Type Parameters
///
/// - `H`: the HTTP transport
/// - `L`: admission check run before each request (defaults to [`Unlimited`])
/// - `C`: clock used for token timestamps (defaults to [`SystemClock`])
///
/// # Example
///
/// ```no_run
/// use jira_notify::webhook::{ReqwestClient, WebhookClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WebhookClient::new(ReqwestClient::new());
/// let url = Url::parse("https://example.test/webhook")?;
/// let reply: serde_json::Value = client
///     .send_signed(&url, "s3cr3t", &serde_json::json!({"status": "ok"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebhookClient<H, L = Unlimited, C = SystemClock> {
    http: H,
    limiter: L,
    signer: TokenSigner<C>,
}

impl<H> WebhookClient<H, Unlimited, SystemClock> {
    /// Creates a client without rate limiting, signing with the system clock.
    #[must_use]
    pub const fn new(http: H) -> Self {
        Self {
            http,
            limiter: Unlimited,
            signer: TokenSigner::new(),
        }
    }
}

impl<H, L, C> WebhookClient<H, L, C> {
    /// Puts a rate limiter in front of the transport.
    #[must_use]
    pub fn with_rate_limit<L2>(self, limiter: L2) -> WebhookClient<H, L2, C> {
        WebhookClient {
            http: self.http,
            limiter,
            signer: self.signer,
        }
    }

    /// Replaces the clock used for token timestamps.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> WebhookClient<H, L, C2> {
        WebhookClient {
            http: self.http,
            limiter: self.limiter,
            signer: TokenSigner::with_clock(clock),
        }
    }
}

impl<H: HttpClient, L: RateLimit, C: Clock> WebhookClient<H, L, C> {
    /// Posts `payload` as JSON and decodes the reply into `R`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] classified by the step that failed:
    /// serialization, rate limiting, transport, status, empty body or decoding.
    pub async fn send<P, R>(&self, url: &url::Url, payload: &P) -> Result<R, DeliveryError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let body = serialize_payload(payload)?;
        let request = HttpRequest::post(url.clone())
            .with_content_type(JSON_CONTENT_TYPE)
            .with_body(body.into_bytes());

        self.deliver(request).await
    }

    /// Posts `payload` wrapped in a token signed with `secret` and decodes
    /// the reply into `R`.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus a
    /// [`SigningFailure`](super::ErrorKind::SigningFailure) if the token
    /// cannot be built.
    pub async fn send_signed<P, R>(
        &self,
        url: &url::Url,
        secret: &str,
        payload: &P,
    ) -> Result<R, DeliveryError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let body = serialize_payload(payload)?;
        let token = self.signer.sign(&body, secret)?;
        let request = HttpRequest::post(url.clone())
            .with_content_type(JWT_CONTENT_TYPE)
            .with_body(token.into_bytes());

        self.deliver(request).await
    }

    async fn deliver<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, DeliveryError> {
        self.limiter.check().map_err(|denied| {
            tracing::warn!(url = %request.url, "Delivery denied by rate limiter: {denied}");
            DeliveryError::rate_limited(denied)
        })?;

        tracing::debug!(
            url = %request.url,
            content_type = request.content_type().unwrap_or_default(),
            "Submitting update to Jira"
        );

        let response = self
            .http
            .request(request)
            .await
            .map_err(DeliveryError::transport)?;

        decode_response(&response)
    }
}

fn decode_response<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, DeliveryError> {
    if !response.is_success() {
        tracing::error!(
            status = response.status.as_u16(),
            "Error response body when submitting update to Jira: {}",
            String::from_utf8_lossy(&response.body)
        );
        return Err(DeliveryError::server_error(response.status));
    }

    if response.body.is_empty() {
        return Err(DeliveryError::empty_response());
    }

    serde_json::from_slice(&response.body).map_err(DeliveryError::decode)
}
