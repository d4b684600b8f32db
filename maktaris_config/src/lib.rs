use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use maktaris_models::email_address::{EmailAddress, EmailAddressWithName};
use serde::Deserialize;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Environment variable holding a colon separated list of config file paths.
pub const CONFIG_PATH_ENV_VAR: &str = "MAKTARIS_CONFIG";

const ENV_PREFIX: &str = "MAKTARIS";

/// Loads the configuration from the files listed in [`CONFIG_PATH_ENV_VAR`]
/// (falling back to [`DEFAULT_CONFIG_PATH`]), with `MAKTARIS__`-prefixed
/// environment variables overriding individual keys.
pub fn load() -> anyhow::Result<Config> {
    let paths = match std::env::var(CONFIG_PATH_ENV_VAR) {
        Ok(paths) => paths.split(':').map(PathBuf::from).collect(),
        Err(_) => vec![PathBuf::from(DEFAULT_CONFIG_PATH)],
    };
    load_paths(&paths)
}

pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub ratelimit: RateLimitConfig,
    pub health: HealthConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub real_ip: Option<RealIpConfig>,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
    pub connect_timeout: Duration,
    pub socket_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub email: EmailAddress,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Production deployments get generic error bodies without details.
    pub production: bool,
}

impl RuntimeConfig {
    pub fn environment(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let config = load_paths(&[Path::new(DEFAULT_CONFIG_PATH)]).unwrap();

        assert_eq!(config.ratelimit.max_requests, 5);
        assert_eq!(config.ratelimit.window.as_secs(), 15 * 60);
        assert_eq!(config.email.connect_timeout.as_secs(), 5);
        assert_eq!(config.email.socket_timeout.as_secs(), 10);
        assert!(!config.runtime.production);
    }
}
