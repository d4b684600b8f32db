use maktaris_config::Config;
use maktaris_di::Provide;
use maktaris_email_contracts::EmailService;
use tracing::info;

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email).await?;
    email.ping().await?;

    let config_provider = ConfigProvider::new(&config);
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!(
        "Starting http server on {}:{} ({})",
        config.http.host,
        config.http.port,
        config.runtime.environment(),
    );
    server.serve(config.http.host, config.http.port).await
}
