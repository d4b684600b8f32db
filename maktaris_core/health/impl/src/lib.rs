use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use maktaris_core_health_contracts::{HealthFeatureService, HealthReport};
use maktaris_di::Build;
use maktaris_email_contracts::EmailService;
use maktaris_shared_contracts::time::TimeService;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone, Build)]
pub struct HealthFeatureServiceImpl<Time, Email> {
    time: Time,
    email: Email,
    config: HealthFeatureConfig,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedPing>>,
}

#[derive(Debug)]
struct CachedPing {
    healthy: bool,
    checked_at: DateTime<Utc>,
}

impl<Time, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Email>
where
    Time: TimeService,
    Email: EmailService,
{
    async fn report(&self) -> HealthReport {
        let now = self.time.now();

        HealthReport {
            healthy: self.smtp_healthy(now).await,
            timestamp: now,
            memory_usage: resident_memory_bytes(),
        }
    }
}

impl<Time, Email> HealthFeatureServiceImpl<Time, Email>
where
    Email: EmailService,
{
    async fn smtp_healthy(&self, now: DateTime<Utc>) -> bool {
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.checked_at + self.config.cache_ttl)
        {
            return cached.healthy;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.checked_at + self.config.cache_ttl)
        {
            return cached.healthy;
        }

        let healthy = self
            .email
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
            .is_ok();

        cache_guard
            .insert(CachedPing {
                healthy,
                checked_at: now,
            })
            .healthy
    }
}

#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    // second field of /proc/self/statm is the resident set in pages
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages = statm.split_whitespace().nth(1)?.parse::<u64>().ok()?;
    Some(pages * 4096)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use maktaris_email_contracts::MockEmailService;
    use maktaris_shared_contracts::time::MockTimeService;

    use super::*;

    const TTL: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn healthy_when_smtp_answers() {
        // Arrange
        let now = base();
        let sut = sut(
            MockTimeService::new().with_now(now),
            MockEmailService::new().with_ping(Ok(())),
        );

        // Act
        let report = sut.report().await;

        // Assert
        assert!(report.healthy);
        assert_eq!(report.timestamp, now);
    }

    #[tokio::test]
    async fn unhealthy_when_smtp_does_not_answer() {
        // Arrange
        let sut = sut(
            MockTimeService::new().with_now(base()),
            MockEmailService::new().with_ping(Err(anyhow::anyhow!("connection refused"))),
        );

        // Act
        let report = sut.report().await;

        // Assert
        assert!(!report.healthy);
    }

    #[tokio::test]
    async fn caches_ping_result_within_ttl() {
        // Arrange
        let now = base();
        let sut = sut(
            MockTimeService::new()
                .with_now(now)
                .with_now(now + TimeDelta::seconds(1)),
            MockEmailService::new().with_ping(Ok(())),
        );

        // Act
        let first = sut.report().await;
        let second = sut.report().await;

        // Assert
        assert!(first.healthy);
        assert!(second.healthy);
    }

    #[tokio::test]
    async fn pings_again_after_ttl_expired() {
        // Arrange
        let now = base();
        let sut = sut(
            MockTimeService::new()
                .with_now(now)
                .with_now(now + TimeDelta::seconds(3)),
            MockEmailService::new()
                .with_ping(Ok(()))
                .with_ping(Err(anyhow::anyhow!("connection refused"))),
        );

        // Act
        let first = sut.report().await;
        let second = sut.report().await;

        // Assert
        assert!(first.healthy);
        assert!(!second.healthy);
    }

    fn base() -> DateTime<Utc> {
        DateTime::from_timestamp(1_754_300_000, 0).unwrap()
    }

    fn sut(
        time: MockTimeService,
        email: MockEmailService,
    ) -> HealthFeatureServiceImpl<MockTimeService, MockEmailService> {
        HealthFeatureServiceImpl {
            time,
            email,
            config: HealthFeatureConfig { cache_ttl: TTL },
            state: Default::default(),
        }
    }
}
