use std::time::Duration;

use anyhow::{anyhow, Context};
use lettre::{
    message::{header, MessageBuilder, MultiPart},
    transport::smtp::PoolConfig,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use maktaris_email_contracts::{Email, EmailService};
use maktaris_models::{email_address::EmailAddressWithName, MessageId};
use maktaris_utils::Apply;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    connect_timeout: Duration,
}

impl EmailServiceImpl {
    pub async fn new(
        url: &str,
        from: EmailAddressWithName,
        connect_timeout: Duration,
        socket_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)?
            .timeout(Some(socket_timeout))
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        Ok(Self {
            from,
            transport,
            connect_timeout,
        })
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<Option<MessageId>> {
        let message_id = MessageId::from(format!(
            "<{}@{}>",
            Uuid::new_v4(),
            self.from.0.email.domain()
        ));
        let message = build_message(&self.from, email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map(|response| response.is_positive().then_some(message_id))
            .map_err(Into::into)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        tokio::time::timeout(self.connect_timeout, self.transport.test_connection())
            .await
            .context("Timed out connecting to smtp server")??
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn build_message(
    from: &EmailAddressWithName,
    email: Email,
    message_id: &MessageId,
) -> anyhow::Result<Message> {
    let builder = Message::builder()
        .from(from.0.clone())
        .to(email.recipient.0)
        .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
        .subject(email.subject)
        .message_id(Some(message_id.clone().into_inner()));

    match email.html {
        Some(html) => builder
            .multipart(MultiPart::alternative_plain_html(email.text, html))
            .map_err(Into::into),
        None => builder
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.text)
            .map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from() -> EmailAddressWithName {
        "Maktaris Website <contact@maktaris.com>".parse().unwrap()
    }

    fn email() -> Email {
        Email {
            recipient: "Info <info@maktaris.com>".parse().unwrap(),
            subject: "New Contact: Wholesale order".into(),
            text: "Name: Dali\nEmail: dali@example.com\nMessage: Hi".into(),
            html: None,
            reply_to: Some("Dali <dali@example.com>".parse().unwrap()),
        }
    }

    #[test]
    fn builds_plain_text_message() {
        // Arrange
        let message_id = MessageId::from("<test@maktaris.com>".to_owned());

        // Act
        let message = build_message(&from(), email(), &message_id).unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: \"Maktaris Website\" <contact@maktaris.com>"));
        assert!(formatted.contains("To: \"Info\" <info@maktaris.com>"));
        assert!(formatted.contains("Reply-To: \"Dali\" <dali@example.com>"));
        assert!(formatted.contains("Subject: New Contact: Wholesale order"));
        assert!(formatted.contains("Message-ID: <test@maktaris.com>"));
        assert!(formatted.contains("Content-Type: text/plain"));
        assert!(formatted.contains("Name: Dali"));
    }

    #[test]
    fn builds_multipart_message_when_html_is_set() {
        // Arrange
        let message_id = MessageId::from("<test@maktaris.com>".to_owned());
        let email = email().with(|e| e.html = Some("<h2>New Contact Form Submission</h2>".into()));

        // Act
        let message = build_message(&from(), email, &message_id).unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Content-Type: multipart/alternative"));
        assert!(formatted.contains("Content-Type: text/plain"));
        assert!(formatted.contains("Content-Type: text/html"));
        assert!(formatted.contains("New Contact Form Submission"));
    }

    #[test]
    fn omits_reply_to_when_absent() {
        // Arrange
        let message_id = MessageId::from("<test@maktaris.com>".to_owned());
        let email = email().with(|e| e.reply_to = None);

        // Act
        let message = build_message(&from(), email, &message_id).unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(!formatted.contains("Reply-To:"));
    }
}
