//! Contact form submission state machine

use std::time::Duration;

use chrono::{DateTime, Utc};
use maktaris_models::submission::{self, ContactSubmission, FieldName, SubmissionDraft};
use maktaris_shared_contracts::time::TimeService;

use crate::{SubmissionClient, SubmitError};

/// Delay after which a finished submission returns to the idle form.
pub const RESET_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

/// Draft contact submission together with its submission state.
///
/// The state moves idle -> sending -> success | error and back to idle once
/// [`RESET_DELAY`] has elapsed. While sending, further submissions are
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    draft: SubmissionDraft,
    state: SubmissionState,
    reset_at: Option<DateTime<Utc>>,
}

impl ContactForm {
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn field(&self, field: FieldName) -> &str {
        self.draft.field(field)
    }

    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        *self.draft.field_mut(field) = value.into();
    }

    /// Returns the fields blocking submission, for inline error rendering.
    pub fn missing_fields(&self) -> Vec<FieldName> {
        submission::missing_fields(&self.draft)
    }

    /// Starts a submission attempt.
    ///
    /// Returns the validated submission to relay, or `None` if a submission
    /// is already in flight or the draft does not validate.
    pub fn submit(&mut self) -> Option<ContactSubmission> {
        if !matches!(self.state, SubmissionState::Idle | SubmissionState::Error) {
            return None;
        }

        let submission = submission::validate(&self.draft).ok()?;
        self.state = SubmissionState::Sending;
        self.reset_at = None;
        Some(submission)
    }

    /// Records the outcome of the submission started by [`Self::submit`].
    ///
    /// A delivered submission clears the draft, a failed one keeps it so the
    /// user can retry without retyping.
    pub fn complete(&mut self, result: Result<(), SubmitError>, now: DateTime<Utc>) {
        self.state = match result {
            Ok(()) => {
                self.draft = SubmissionDraft::default();
                SubmissionState::Success
            }
            Err(SubmitError) => SubmissionState::Error,
        };
        self.reset_at = Some(now + RESET_DELAY);
    }

    /// Returns the form to idle once [`RESET_DELAY`] has elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        if self.reset_at.is_some_and(|reset_at| reset_at <= now) {
            self.state = SubmissionState::Idle;
            self.reset_at = None;
        }
    }

    /// Runs a full submission attempt against the relay.
    ///
    /// No request is issued when the draft does not validate or a submission
    /// is already in flight.
    pub async fn submit_via(
        &mut self,
        client: &SubmissionClient,
        time: &impl TimeService,
    ) -> SubmissionState {
        if let Some(submission) = self.submit() {
            let result = client.submit(&submission).await.map(drop);
            self.complete(result, time.now());
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use maktaris_shared_contracts::time::MockTimeService;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn submits_valid_draft_once() {
        // Arrange
        let mut form = filled_form();

        // Act
        let submission = form.submit();

        // Assert
        let submission = submission.unwrap();
        assert_eq!(&*submission.author.name, "Dali Ben Salah");
        assert_eq!(form.state(), SubmissionState::Sending);
        assert_eq!(form.submit(), None);
    }

    #[test]
    fn blocks_invalid_draft() {
        // Arrange
        let mut form = filled_form();
        form.set_field(FieldName::Message, "   ");

        // Act
        let submission = form.submit();

        // Assert
        assert_eq!(submission, None);
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.missing_fields(), [FieldName::Message]);
    }

    #[test]
    fn delivery_clears_draft_and_resets_after_delay() {
        // Arrange
        let mut form = filled_form();
        form.submit().unwrap();

        // Act
        form.complete(Ok(()), base());

        // Assert
        assert_eq!(form.state(), SubmissionState::Success);
        for field in FieldName::ALL {
            assert_eq!(form.field(field), "");
        }

        form.poll(base() + Duration::from_secs(4));
        assert_eq!(form.state(), SubmissionState::Success);

        form.poll(base() + RESET_DELAY);
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn failure_retains_draft_for_retry() {
        // Arrange
        let mut form = filled_form();
        form.submit().unwrap();

        // Act
        form.complete(Err(SubmitError), base());

        // Assert
        assert_eq!(form.state(), SubmissionState::Error);
        assert_eq!(form.field(FieldName::Name), "Dali Ben Salah");

        form.poll(base() + RESET_DELAY);
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn resubmits_from_error_state() {
        // Arrange
        let mut form = filled_form();
        form.submit().unwrap();
        form.complete(Err(SubmitError), base());

        // Act
        let submission = form.submit();

        // Assert
        assert!(submission.is_some());
        assert_eq!(form.state(), SubmissionState::Sending);
    }

    #[test]
    fn poll_is_a_noop_while_sending() {
        // Arrange
        let mut form = filled_form();
        form.submit().unwrap();

        // Act
        form.poll(base() + Duration::from_secs(3600));

        // Assert
        assert_eq!(form.state(), SubmissionState::Sending);
    }

    #[tokio::test]
    async fn skips_request_when_draft_is_invalid() {
        // Arrange
        let mut form = ContactForm::default();
        let client = SubmissionClient::new(&"http://localhost:0/".parse().unwrap()).unwrap();
        let time = MockTimeService::new();

        // Act
        let state = form.submit_via(&client, &time).await;

        // Assert
        assert_eq!(state, SubmissionState::Idle);
    }

    fn filled_form() -> ContactForm {
        let mut form = ContactForm::default();
        form.set_field(FieldName::Name, "Dali Ben Salah");
        form.set_field(FieldName::Email, "dali@example.com");
        form.set_field(FieldName::Subject, "Wholesale order");
        form.set_field(FieldName::Message, "Twelve cases, please.");
        form
    }

    fn base() -> DateTime<Utc> {
        DateTime::from_timestamp(1_754_300_000, 0).unwrap()
    }
}
