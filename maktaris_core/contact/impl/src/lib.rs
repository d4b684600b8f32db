use std::{net::IpAddr, sync::Arc};

use maktaris_core_contact_contracts::{ContactFeatureService, ContactSendError};
use maktaris_di::Build;
use maktaris_email_contracts::{Email, EmailService};
use maktaris_models::{
    email_address::EmailAddress,
    submission::{self, SubmissionDraft},
    MessageId,
};
use maktaris_ratelimit_contracts::{RateLimitDecision, RateLimiter};
use maktaris_templates_contracts::{ContactEmailTemplate, TemplateService};
use maktaris_utils::trace_instrument;

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<RateLimit, Template, Email> {
    ratelimit: RateLimit,
    template: Template,
    email: Email,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub email: Arc<EmailAddress>,
}

const SUBJECT_MAX_CHARS: usize = 100;

impl<RateLimit, Template, EmailS> ContactFeatureService
    for ContactFeatureServiceImpl<RateLimit, Template, EmailS>
where
    RateLimit: RateLimiter,
    Template: TemplateService,
    EmailS: EmailService,
{
    #[trace_instrument(skip(self))]
    async fn send_message(
        &self,
        client_ip: IpAddr,
        draft: SubmissionDraft,
    ) -> Result<MessageId, ContactSendError> {
        if let RateLimitDecision::Limited { retry_after } = self.ratelimit.check(client_ip).await? {
            return Err(ContactSendError::RateLimited { retry_after });
        }

        let submission = submission::validate(&draft).map_err(ContactSendError::Validation)?;

        let html = self.template.render(&ContactEmailTemplate {
            name: submission.author.name.clone().into_inner(),
            email: submission.author.email.as_str().into(),
            subject: submission.subject.clone().into_inner(),
            message: submission.message.clone().into_inner(),
        })?;

        let email = Email {
            recipient: (*self.config.email).clone().into(),
            subject: subject_line(&submission.subject),
            text: format!(
                "Name: {}\nEmail: {}\nSubject: {}\nMessage:\n{}",
                *submission.author.name,
                submission.author.email,
                *submission.subject,
                *submission.message,
            ),
            html: Some(html),
            reply_to: Some(
                submission
                    .author
                    .email
                    .with_name(submission.author.name.into_inner()),
            ),
        };

        self.email.send(email).await?.ok_or(ContactSendError::Send)
    }
}

fn subject_line(subject: &submission::SubmissionSubject) -> String {
    let mut line = format!("New Contact: {}", **subject);
    if let Some((idx, _)) = line.char_indices().nth(SUBJECT_MAX_CHARS) {
        line.truncate(idx);
    }
    line
}
