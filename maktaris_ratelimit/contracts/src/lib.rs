use std::{future::Future, net::IpAddr, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimiter: Send + Sync + 'static {
    /// Records a request for `key` and decides whether it may proceed.
    fn check(&self, key: IpAddr)
        -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// The request must be rejected. `retry_after` is the time until the
    /// oldest recorded request leaves the window.
    Limited { retry_after: Duration },
}

#[cfg(feature = "mock")]
impl MockRateLimiter {
    pub fn with_check(mut self, key: IpAddr, decision: RateLimitDecision) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(move |_| Box::pin(std::future::ready(Ok(decision))));
        self
    }
}
