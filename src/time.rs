//! Time abstractions for testability.
//!
//! [`Clock`] supplies token timestamps and [`Sleeper`] supplies retry delays,
//! so tests can pin the former and skip the latter.

use std::time::{Duration, SystemTime};

/// Abstraction over system time.
///
/// # Example
///
/// ```
/// use jira_notify::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.unix_seconds() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current time as whole seconds since the Unix epoch.
    ///
    /// Pre-epoch clocks report 0.
    fn unix_seconds(&self) -> u64 {
        self.now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// Production clock delegating to [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at a fixed instant.
///
/// Used to produce deterministic token timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl FixedClock {
    /// Creates a clock fixed at `secs` seconds after the Unix epoch.
    #[must_use]
    pub fn at_unix(secs: u64) -> Self {
        Self(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Abstraction over async sleeping, used between retry attempts.
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A clock that can be advanced manually.
    struct SteppingClock {
        secs: AtomicU64,
    }

    impl SteppingClock {
        fn new(initial_secs: u64) -> Self {
            Self {
                secs: AtomicU64::new(initial_secs),
            }
        }

        fn advance(&self, secs: u64) {
            self.secs.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn system_clock_returns_current_time() {
        let before = SystemTime::now();
        let result = SystemClock.now();
        let after = SystemTime::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn fixed_clock_reports_unix_seconds() {
        let clock = FixedClock::at_unix(1_700_000_000);

        assert_eq!(clock.unix_seconds(), 1_700_000_000);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn pre_epoch_clock_reports_zero() {
        let clock = FixedClock(SystemTime::UNIX_EPOCH - Duration::from_secs(10));

        assert_eq!(clock.unix_seconds(), 0);
    }

    #[test]
    fn unix_seconds_follows_clock() {
        let clock = SteppingClock::new(100);
        assert_eq!(clock.unix_seconds(), 100);

        clock.advance(50);
        assert_eq!(clock.unix_seconds(), 150);
    }

    #[test]
    fn clocks_and_sleepers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClock>();
        assert_send_sync::<FixedClock>();
        assert_send_sync::<TokioSleeper>();
        assert_send_sync::<InstantSleeper>();
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_duration() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(5)).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn instant_sleeper_returns_immediately() {
        let start = std::time::Instant::now();
        InstantSleeper.sleep(Duration::from_secs(3600)).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
