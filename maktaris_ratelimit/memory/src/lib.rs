use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use maktaris_di::Build;
use maktaris_ratelimit_contracts::{RateLimitDecision, RateLimiter};
use maktaris_shared_contracts::time::TimeService;
use maktaris_utils::trace_instrument;
use tokio::sync::Mutex;

/// Sliding window rate limiter keeping its state in process memory.
///
/// Correct for a single process only. Multi-instance deployments need an
/// externally backed [`RateLimiter`] instead.
#[derive(Debug, Clone, Build)]
pub struct MemoryRateLimiter<Time> {
    time: Time,
    config: MemoryRateLimiterConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    windows: Mutex<HashMap<IpAddr, Vec<DateTime<Utc>>>>,
}

#[derive(Debug, Clone)]
pub struct MemoryRateLimiterConfig {
    pub window: Duration,
    pub max_requests: u64,
}

impl<Time> RateLimiter for MemoryRateLimiter<Time>
where
    Time: TimeService,
{
    #[trace_instrument(skip(self))]
    async fn check(&self, key: IpAddr) -> anyhow::Result<RateLimitDecision> {
        let now = self.time.now();
        let window = TimeDelta::from_std(self.config.window)?;
        let cutoff = now - window;

        let mut windows = self.state.windows.lock().await;
        let timestamps = windows.entry(key).or_default();
        timestamps.retain(|&timestamp| timestamp > cutoff);

        if (timestamps.len() as u64) < self.config.max_requests {
            timestamps.push(now);
            return Ok(RateLimitDecision::Allowed);
        }

        // timestamps are pushed in order, so the first one expires first
        let retry_after = timestamps
            .first()
            .map(|&oldest| (oldest + window - now).to_std().unwrap_or_default())
            .unwrap_or(self.config.window);
        Ok(RateLimitDecision::Limited { retry_after })
    }
}
