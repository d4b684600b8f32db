use std::future::Future;

use chrono::{DateTime, Utc};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait HealthFeatureService: Send + Sync + 'static {
    /// Returns the current health of the service and its SMTP upstream.
    fn report(&self) -> impl Future<Output = HealthReport> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Whether the SMTP server answered a connection test recently.
    pub healthy: bool,
    pub timestamp: DateTime<Utc>,
    /// Resident set size in bytes, if the platform exposes it.
    pub memory_usage: Option<u64>,
}

#[cfg(feature = "mock")]
impl MockHealthFeatureService {
    pub fn with_report(mut self, report: HealthReport) -> Self {
        self.expect_report()
            .once()
            .return_once(move || Box::pin(std::future::ready(report)));
        self
    }
}
