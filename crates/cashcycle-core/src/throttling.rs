use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::provider_policy::ProviderPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Shared call budget for one provider.
///
/// Clones share the same budget, so the adapter and anything it hands the
/// queue to draw from one quota.
#[derive(Clone)]
pub struct ThrottlingQueue {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl std::fmt::Debug for ThrottlingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottlingQueue").finish_non_exhaustive()
    }
}

impl ThrottlingQueue {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                quota_limit,
            ))),
            clock: DefaultClock::default(),
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit)
    }

    /// Budget large enough to never throttle; for offline runs and tests.
    pub fn unlimited() -> Self {
        Self::new(Duration::from_millis(1), u32::MAX)
    }

    /// Takes one call from the budget, or returns how long until one frees up.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Waits until the budget allows one more call, then takes it.
    pub async fn wait(&self) {
        if let Err(delay) = self.try_acquire() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "rate budget exhausted, waiting");
            self.limiter.until_ready().await;
        }
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.000_001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_calls_beyond_the_burst() {
        let queue = ThrottlingQueue::new(Duration::from_secs(60), 2);

        assert!(queue.try_acquire().is_ok());
        assert!(queue.try_acquire().is_ok());

        let delay = queue.try_acquire().expect_err("third call should be throttled");
        assert!(delay > Duration::from_secs(25), "delay was {delay:?}");
        assert!(delay <= Duration::from_secs(30), "delay was {delay:?}");
    }

    #[test]
    fn clones_share_one_budget() {
        let queue = ThrottlingQueue::new(Duration::from_secs(60), 1);
        let clone = queue.clone();

        assert!(queue.try_acquire().is_ok());
        assert!(clone.try_acquire().is_err());
    }

    #[tokio::test]
    async fn unlimited_queue_never_blocks() {
        let queue = ThrottlingQueue::unlimited();
        for _ in 0..1_000 {
            queue.wait().await;
        }
    }
}
