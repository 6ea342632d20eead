//! Step-level orchestration around [`WebhookClient`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::site::{CredentialStore, SiteConfig, SiteError, SiteResolver, select_site};
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::webhook::{DeliveryError, HttpClient, RateLimit, RetryPolicy, Unlimited, WebhookClient};

use super::{
    Acceptance, BuildApiResponse, DeploymentApiResponse, EventKind, SendInfoResponse, SendStatus,
};

/// Sends build and deployment events to a configured Jira site.
///
/// Plays the part of the pipeline step: pick the site, fetch its secret,
/// deliver, redeliver per [`RetryPolicy`], and summarize the outcome as a
/// [`SendInfoResponse`]. Failures never escape as errors; they become
/// `FAILURE_*` statuses.
pub struct Notifier<H, L = Unlimited, C = SystemClock, S = TokioSleeper> {
    client: WebhookClient<H, L, C>,
    sites: Box<dyn SiteResolver>,
    credentials: Box<dyn CredentialStore>,
    retry_policy: RetryPolicy,
    sleeper: S,
}

impl<H, L, C> Notifier<H, L, C, TokioSleeper> {
    /// Creates a notifier with a single delivery attempt per event.
    pub fn new(
        client: WebhookClient<H, L, C>,
        sites: impl SiteResolver + 'static,
        credentials: impl CredentialStore + 'static,
    ) -> Self {
        Self {
            client,
            sites: Box::new(sites),
            credentials: Box::new(credentials),
            retry_policy: RetryPolicy::default(),
            sleeper: TokioSleeper,
        }
    }
}

impl<H, L, C, S> Notifier<H, L, C, S> {
    /// Sets the redelivery policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Replaces the sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Notifier<H, L, C, S2> {
        Notifier {
            client: self.client,
            sites: self.sites,
            credentials: self.credentials,
            retry_policy: self.retry_policy,
            sleeper,
        }
    }
}

impl<H: HttpClient, L: RateLimit, C: Clock, S: Sleeper> Notifier<H, L, C, S> {
    /// Sends a build event.
    pub async fn send_build<P>(&self, site: Option<&str>, payload: &P) -> SendInfoResponse
    where
        P: Serialize + ?Sized + Sync,
    {
        self.notify::<P, BuildApiResponse>(EventKind::Build, site, payload)
            .await
    }

    /// Sends a deployment event.
    pub async fn send_deployment<P>(&self, site: Option<&str>, payload: &P) -> SendInfoResponse
    where
        P: Serialize + ?Sized + Sync,
    {
        self.notify::<P, DeploymentApiResponse>(EventKind::Deployment, site, payload)
            .await
    }

    async fn notify<P, R>(&self, kind: EventKind, site: Option<&str>, payload: &P) -> SendInfoResponse
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Acceptance,
    {
        let response = self.submit::<P, R>(kind, site, payload).await;

        if response.is_success() {
            tracing::info!("{}: {response}", kind.step_name());
        } else {
            tracing::warn!("{}: {response}", kind.step_name());
        }

        response
    }

    async fn submit<P, R>(&self, kind: EventKind, site: Option<&str>, payload: &P) -> SendInfoResponse
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Acceptance,
    {
        let target = match select_site(self.sites.as_ref(), site) {
            Ok(target) => target,
            Err(e) => return site_failure(site, &e),
        };

        let secret = match target.credentials_id.as_deref() {
            Some(id) => match self.credentials.secret(id) {
                Some(secret) => Some(secret),
                None => {
                    return SendInfoResponse::new(
                        Some(target.site.as_str()),
                        SendStatus::FailureSecretNotFound,
                        format!("No secret found for credentials id '{id}'"),
                    );
                }
            },
            None => None,
        };

        match self
            .deliver::<P, R>(&target, secret.as_deref(), payload)
            .await
        {
            Ok(reply) => SendInfoResponse::from_reply(kind, &target.site, &reply),
            Err(e) => SendInfoResponse::new(
                Some(target.site.as_str()),
                SendStatus::api_failure(kind),
                e.message(),
            ),
        }
    }

    async fn deliver<P, R>(
        &self,
        target: &SiteConfig,
        secret: Option<&str>,
        payload: &P,
    ) -> Result<R, DeliveryError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut attempt = 1;

        loop {
            let result = match secret {
                Some(secret) => {
                    self.client
                        .send_signed(&target.webhook_url, secret, payload)
                        .await
                }
                None => self.client.send(&target.webhook_url, payload).await,
            };

            match result {
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay_for_retry(attempt - 1);
                    tracing::warn!(
                        site = %target.site,
                        attempt,
                        kind = %e.kind(),
                        "Delivery failed, retrying in {}ms: {e}",
                        delay.as_millis()
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn site_failure(site: Option<&str>, error: &SiteError) -> SendInfoResponse {
    let status = match error {
        SiteError::NotFound(_) => SendStatus::FailureSiteConfigNotFound,
        SiteError::NoneConfigured => SendStatus::FailureNoSiteConfigPresent,
        SiteError::Ambiguous { .. } => SendStatus::FailureMultipleSiteConfigsPresent,
    };
    SendInfoResponse::new(site, status, error.to_string())
}
