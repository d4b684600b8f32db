use std::sync::Arc;

use maktaris_api_rest::{RealIpConfig, RestServerConfig};
use maktaris_config::Config;
use maktaris_core_contact_impl::ContactFeatureConfig;
use maktaris_core_health_impl::HealthFeatureConfig;
use maktaris_di::provider;
use maktaris_ratelimit_memory::MemoryRateLimiterConfig;
use types::Email;

pub mod types;

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Ratelimit
            MemoryRateLimiterConfig,

            // Core
            ContactFeatureConfig,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Ratelimit
        ratelimit_config: MemoryRateLimiterConfig,

        // Core
        contact_feature_config: ContactFeatureConfig,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        // API
        let rest_server_config = RestServerConfig {
            allowed_origins: config.http.allowed_origins.clone(),
            real_ip: config.http.real_ip.as_ref().map(|real_ip| {
                Arc::new(RealIpConfig {
                    header: real_ip.header.clone(),
                    set_from: real_ip.set_from,
                })
            }),
            production: config.runtime.production,
        };

        // Ratelimit
        let ratelimit_config = MemoryRateLimiterConfig {
            window: config.ratelimit.window.into(),
            max_requests: config.ratelimit.max_requests,
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            email: Arc::new(config.contact.email.clone()),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Self {
            _cache: Default::default(),

            // API
            rest_server_config,

            // Ratelimit
            ratelimit_config,

            // Core
            contact_feature_config,
            health_feature_config,
        }
    }
}
