use maktaris_core_contact_impl::ContactFeatureServiceImpl;
use maktaris_core_health_impl::HealthFeatureServiceImpl;
use maktaris_email_impl::EmailServiceImpl;
use maktaris_ratelimit_memory::MemoryRateLimiter;
use maktaris_shared_impl::time::TimeServiceImpl;
use maktaris_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = maktaris_api_rest::RestServer<ContactFeature, HealthFeature>;

// Email
pub type Email = EmailServiceImpl;

// Template
pub type Template = TemplateServiceImpl;

// Shared
pub type Time = TimeServiceImpl;

// Ratelimit
pub type RateLimit = MemoryRateLimiter<Time>;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<RateLimit, Template, Email>;
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;
