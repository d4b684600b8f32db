use std::future::Future;

use maktaris_models::{email_address::EmailAddressWithName, MessageId};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Sends an email.
    ///
    /// Returns the identifier assigned to the message if the server accepted
    /// it, or `None` if it was rejected.
    fn send(
        &self,
        email: Email,
    ) -> impl Future<Output = anyhow::Result<Option<MessageId>>> + Send;

    /// Verify the connection to the SMTP server.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub text: String,
    /// Optional HTML rendering, sent as a `multipart/alternative` part
    /// alongside the plain text.
    pub html: Option<String>,
    pub reply_to: Option<EmailAddressWithName>,
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Option<MessageId>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_ping(mut self, result: anyhow::Result<()>) -> Self {
        self.expect_ping()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
