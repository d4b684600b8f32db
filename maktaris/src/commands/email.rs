use anyhow::ensure;
use clap::Subcommand;
use maktaris_config::Config;
use maktaris_email_contracts::{Email, EmailService};
use maktaris_models::email_address::EmailAddressWithName;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email).await?;

    let message_id = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            text: "Email deliverability seems to be working!".into(),
            html: None,
            reply_to: None,
        })
        .await?;

    ensure!(message_id.is_some(), "Failed to send email");

    Ok(())
}
