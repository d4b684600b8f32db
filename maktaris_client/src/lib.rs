use std::sync::LazyLock;

use anyhow::Context;
use maktaris_models::{
    submission::{ContactSubmission, SubmissionDraft},
    MessageId,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub mod form;
pub mod render;

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    let homepage = env!("CARGO_PKG_HOMEPAGE");
    let repository = env!("CARGO_PKG_REPOSITORY");
    let version = env!("CARGO_PKG_VERSION");

    format!("Maktaris Contact Client ({homepage}, {repository}, Version {version})")
});

const _: () = {
    assert!(!env!("CARGO_PKG_HOMEPAGE").is_empty());
    assert!(!env!("CARGO_PKG_REPOSITORY").is_empty());
};

/// Client for the contact form relay endpoint.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SubmissionClient {
    /// Creates a client submitting to the relay behind `base_url`.
    pub fn new(base_url: &Url) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent(&*USER_AGENT)
                .build()
                .context("Failed to build http client")?,
            endpoint: base_url
                .join("api/send-email")
                .context("Failed to construct relay endpoint url")?,
        })
    }

    /// Submits a validated contact submission to the relay.
    ///
    /// Exactly one request is issued per call. Transport failures, non-2xx
    /// responses and malformed response bodies all collapse into the same
    /// opaque [`SubmitError`] with the cause logged locally.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<SendReceipt, SubmitError> {
        let draft = SubmissionDraft {
            name: submission.author.name.clone().into_inner(),
            email: submission.author.email.as_str().into(),
            subject: submission.subject.clone().into_inner(),
            message: submission.message.clone().into_inner(),
        };

        self.http
            .post(self.endpoint.clone())
            .json(&draft)
            .send()
            .await
            .map_err(SubmitError::report)?
            .error_for_status()
            .map_err(SubmitError::report)?
            .json()
            .await
            .map_err(SubmitError::report)
    }
}

/// Relay confirmation for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub success: bool,
    pub message: String,
    pub message_id: MessageId,
}

/// Opaque submission failure.
///
/// The relay's error categories are not distinguished here, the user can
/// only retry either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to send your message. Please try again.")]
pub struct SubmitError;

impl SubmitError {
    fn report(err: reqwest::Error) -> Self {
        tracing::debug!("contact submission failed: {err}");
        Self
    }
}
