use std::{future::Future, net::IpAddr, time::Duration};

use maktaris_models::{
    submission::{FieldError, SubmissionDraft},
    MessageId,
};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Relays a contact form submission to the operator mailbox.
    ///
    /// The submission is rate limited per client ip and validated before any
    /// email is constructed.
    fn send_message(
        &self,
        client_ip: IpAddr,
        draft: SubmissionDraft,
    ) -> impl Future<Output = Result<MessageId, ContactSendError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendError {
    #[error("Too many requests.")]
    RateLimited { retry_after: Duration },
    #[error("Invalid submission.")]
    Validation(Vec<FieldError>),
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        client_ip: IpAddr,
        draft: SubmissionDraft,
        result: Result<MessageId, ContactSendError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(
                mockall::predicate::eq(client_ip),
                mockall::predicate::eq(draft),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}
