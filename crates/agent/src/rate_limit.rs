//! Rate-limited caller for model requests.
//!
//! Every model call in a run goes through one [`RateLimiter`]. It enforces a
//! minimum gap between the *starts* of consecutive calls and retries exactly
//! once, after a long pause, when the provider answers "too many requests".
//!
//! The gate is a single async mutex held while waiting, so concurrent
//! callers sharing a limiter are serialized as well.

use crate::config::RunConfig;
use miniagent_core::error::ProviderError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct RateLimiter {
    min_interval: Duration,
    overload_delay: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, overload_delay: Duration) -> Self {
        Self {
            min_interval,
            overload_delay,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.min_call_interval, config.overload_retry_delay)
    }

    /// Run `thunk` under the rate limit.
    ///
    /// `thunk` is invoked once, or twice when the first attempt is
    /// rate-limited. The retry also respects the minimum interval. A second
    /// rate-limit error, or any other error, is returned unchanged.
    pub async fn call<T, F, Fut>(&self, mut thunk: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.acquire_slot().await;
        match thunk().await {
            Err(e) if e.is_rate_limited() => {
                warn!(
                    delay_ms = self.overload_delay.as_millis() as u64,
                    error = %e,
                    "Model is rate limited, retrying once after delay"
                );
                tokio::time::sleep(self.overload_delay).await;
                self.acquire_slot().await;
                thunk().await
            }
            other => other,
        }
    }

    /// Wait until the minimum interval has passed, then record a dispatch.
    async fn acquire_slot(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Rate limiting model call");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}
