//! Outbound rate limiting.
//!
//! A [`RateLimit`] is consulted by [`WebhookClient`] before each request.
//! A denied call fails with [`ErrorKind::RateLimited`] without touching the
//! network.
//!
//! [`WebhookClient`]: super::WebhookClient
//! [`ErrorKind::RateLimited`]: super::ErrorKind::RateLimited

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock as _, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use thiserror::Error;

/// A rate limiter denied the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("next request permitted in {}ms", retry_after.as_millis())]
pub struct RateLimitExceeded {
    /// Time until the limiter would permit another call.
    pub retry_after: Duration,
}

/// Admission check run before each delivery.
pub trait RateLimit: Send + Sync {
    /// Claims one permit, or reports how long until one is available.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] when no permit is available.
    fn check(&self) -> Result<(), RateLimitExceeded>;
}

/// Limiter that admits every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimit for Unlimited {
    fn check(&self) -> Result<(), RateLimitExceeded> {
        Ok(())
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Process-wide token bucket backed by `governor`.
pub struct GovernorRateLimit {
    limiter: DirectLimiter,
    requests_per_minute: NonZeroU32,
    burst: NonZeroU32,
}

impl std::fmt::Debug for GovernorRateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorRateLimit")
            .field("requests_per_minute", &self.requests_per_minute)
            .field("burst", &self.burst)
            .finish_non_exhaustive()
    }
}

impl GovernorRateLimit {
    /// Creates a limiter replenishing `requests_per_minute` permits with
    /// up to `burst` available at once.
    #[must_use]
    pub fn per_minute(requests_per_minute: NonZeroU32, burst: NonZeroU32) -> Self {
        let quota = Quota::per_minute(requests_per_minute).allow_burst(burst);
        Self {
            limiter: RateLimiter::direct(quota),
            requests_per_minute,
            burst,
        }
    }

    /// Returns the configured replenish rate.
    #[must_use]
    pub const fn requests_per_minute(&self) -> NonZeroU32 {
        self.requests_per_minute
    }

    /// Returns the configured burst size.
    #[must_use]
    pub const fn burst(&self) -> NonZeroU32 {
        self.burst
    }
}

impl RateLimit for GovernorRateLimit {
    fn check(&self) -> Result<(), RateLimitExceeded> {
        self.limiter.check().map_err(|not_until| RateLimitExceeded {
            retry_after: not_until.wait_time_from(DefaultClock::default().now()),
        })
    }
}

impl<T: RateLimit + ?Sized> RateLimit for std::sync::Arc<T> {
    fn check(&self) -> Result<(), RateLimitExceeded> {
        (**self).check()
    }
}
