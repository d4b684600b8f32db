use anyhow::Context;
use maktaris_config::EmailConfig;
use maktaris_email_impl::EmailServiceImpl;

/// Connect to the SMTP server
pub async fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(
        &config.smtp_url,
        config.from.clone(),
        config.connect_timeout.into(),
        config.socket_timeout.into(),
    )
    .await
    .context("Failed to connect to SMTP server")
}
