//! Signed webhook tokens.
//!
//! A token is an HS256 JWT whose `request_body_json` claim holds the
//! serialized request payload. The receiving app verifies it with the
//! same shared secret.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::time::{Clock, SystemClock};

use super::DeliveryError;

/// Issuer claim identifying this integration.
pub const ISSUER: &str = "jenkins-plugin";

/// Audience claim identifying the receiving Jira app.
pub const AUDIENCE: &str = "jenkins-forge-app";

/// Token lifetime in seconds. Not configurable.
pub const TOKEN_TTL_SECS: u64 = 300;

/// Name of the claim carrying the serialized payload.
pub const REQUEST_BODY_CLAIM: &str = "request_body_json";

/// Claims carried by a webhook token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookClaims {
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued-at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds), always `iat + TOKEN_TTL_SECS`
    pub exp: u64,
    /// The serialized request payload
    pub request_body_json: String,
}

impl WebhookClaims {
    fn issued_at(iat: u64, request_body_json: &str) -> Self {
        Self {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat,
            exp: iat.saturating_add(TOKEN_TTL_SECS),
            request_body_json: request_body_json.to_string(),
        }
    }
}

/// Produces signed webhook tokens.
///
/// Tokens are minted fresh on every call and never cached.
#[derive(Debug, Clone, Default)]
pub struct TokenSigner<C = SystemClock> {
    clock: C,
}

impl TokenSigner<SystemClock> {
    /// Creates a signer using the system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TokenSigner<C> {
    /// Creates a signer reading timestamps from `clock`.
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Signs an already serialized payload with `secret`.
    ///
    /// The payload string is embedded verbatim; it is not re-serialized.
    ///
    /// # Errors
    ///
    /// Returns a [`SigningFailure`](super::ErrorKind::SigningFailure) error if
    /// the secret is empty or the encoder rejects the key.
    pub fn sign(&self, serialized_payload: &str, secret: &str) -> Result<String, DeliveryError> {
        if secret.is_empty() {
            return Err(DeliveryError::signing("shared secret is empty"));
        }

        let claims = WebhookClaims::issued_at(self.clock.unix_seconds(), serialized_payload);

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| DeliveryError::signing(&e).with_source(e))
    }
}
