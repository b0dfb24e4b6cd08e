use std::time::Duration;

use crate::retry::{Backoff, RetryConfig};

/// Rate quota and retry behaviour for one upstream provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider: &'static str,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub retry: RetryConfig,
}

impl ProviderPolicy {
    /// Alpha Vantage free tier: 5 calls per minute.
    pub fn alphavantage_default() -> Self {
        Self::alphavantage_per_minute(5)
    }

    /// Alpha Vantage with a custom per-minute allowance (premium keys).
    pub fn alphavantage_per_minute(calls_per_minute: u32) -> Self {
        Self {
            provider: "alphavantage",
            quota_window: Duration::from_secs(60),
            quota_limit: calls_per_minute.max(1),
            retry: RetryConfig {
                max_retries: 3,
                backoff: Backoff::Exponential {
                    base: Duration::from_secs(1),
                    factor: 2.0,
                    max: Duration::from_secs(60),
                    jitter: true,
                },
                ..RetryConfig::default()
            },
        }
    }

    /// Wikipedia page fetches for the ticker universe.
    pub fn wikipedia_default() -> Self {
        Self {
            provider: "wikipedia",
            quota_window: Duration::from_secs(1),
            quota_limit: 10,
            retry: RetryConfig::exponential(2),
        }
    }
}
