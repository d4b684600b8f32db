use std::{str::FromStr, sync::LazyLock};

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::email_address::EmailAddress;

/// A fully validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub author: SubmissionAuthor,
    pub subject: SubmissionSubject,
    pub message: SubmissionMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAuthor {
    pub name: SubmissionName,
    pub email: EmailAddress,
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct SubmissionName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct SubmissionSubject(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 2000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct SubmissionMessage(String);

impl SubmissionName {
    pub const MAX_CHARS: usize = 256;
}

impl SubmissionSubject {
    pub const MAX_CHARS: usize = 256;
}

impl SubmissionMessage {
    pub const MAX_CHARS: usize = 2000;
}

/// Raw submission exactly as received from a form or HTTP body.
///
/// Unknown keys are rejected rather than silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl SubmissionDraft {
    pub fn field(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Email => &self.email,
            FieldName::Subject => &self.subject,
            FieldName::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::Name => &mut self.name,
            FieldName::Email => &mut self.email,
            FieldName::Subject => &mut self.subject,
            FieldName::Message => &mut self.message,
        }
    }
}

/// The closed set of submission fields. Unknown keys do not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Name,
    Email,
    Subject,
    Message,
}

impl FieldName {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownFieldError(s.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown submission field {0:?}")]
pub struct UnknownFieldError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field {0} is required")]
    Missing(FieldName),
    #[error("invalid email address {received:?}")]
    InvalidEmail { received: String },
    #[error("field {field} exceeds {max} characters (got {length})")]
    TooLong {
        field: FieldName,
        length: usize,
        max: usize,
    },
}

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Returns the fields which are absent or empty after trimming.
pub fn missing_fields(draft: &SubmissionDraft) -> Vec<FieldName> {
    FieldName::ALL
        .into_iter()
        .filter(|&field| draft.field(field).trim().is_empty())
        .collect()
}

/// Validates a raw draft into a [`ContactSubmission`].
///
/// All field errors are collected, missing fields first.
pub fn validate(draft: &SubmissionDraft) -> Result<ContactSubmission, Vec<FieldError>> {
    let mut errors = missing_fields(draft)
        .into_iter()
        .map(FieldError::Missing)
        .collect::<Vec<_>>();

    let email_raw = draft.email.trim();
    let email = if email_raw.is_empty() {
        None
    } else if !EMAIL_REGEX.is_match(email_raw) {
        errors.push(FieldError::InvalidEmail {
            received: email_raw.into(),
        });
        None
    } else {
        match email_raw.parse::<EmailAddress>() {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push(FieldError::InvalidEmail {
                    received: email_raw.into(),
                });
                None
            }
        }
    };

    let name = check_length(
        &mut errors,
        FieldName::Name,
        &draft.name,
        SubmissionName::MAX_CHARS,
        SubmissionName::try_new,
    );
    let subject = check_length(
        &mut errors,
        FieldName::Subject,
        &draft.subject,
        SubmissionSubject::MAX_CHARS,
        SubmissionSubject::try_new,
    );
    let message = check_length(
        &mut errors,
        FieldName::Message,
        &draft.message,
        SubmissionMessage::MAX_CHARS,
        SubmissionMessage::try_new,
    );

    match (name, email, subject, message) {
        (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
            Ok(ContactSubmission {
                author: SubmissionAuthor { name, email },
                subject,
                message,
            })
        }
        _ => Err(errors),
    }
}

fn check_length<T, E>(
    errors: &mut Vec<FieldError>,
    field: FieldName,
    raw: &str,
    max: usize,
    construct: impl FnOnce(String) -> Result<T, E>,
) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        // already reported as missing
        return None;
    }

    let length = trimmed.chars().count();
    if length > max {
        errors.push(FieldError::TooLong { field, length, max });
        return None;
    }

    construct(trimmed.into()).ok()
}

#[cfg(test)]
mod tests {
    use maktaris_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn draft() -> SubmissionDraft {
        SubmissionDraft {
            name: "Dali Ben Salah".into(),
            email: "dali@example.com".into(),
            subject: "Wholesale order".into(),
            message: "I would like to order twelve cases.".into(),
        }
    }

    #[test]
    fn accepts_valid_draft() {
        // Act
        let submission = validate(&draft()).unwrap();

        // Assert
        assert_eq!(&*submission.author.name, "Dali Ben Salah");
        assert_eq!(submission.author.email.as_str(), "dali@example.com");
        assert_eq!(&*submission.subject, "Wholesale order");
        assert_eq!(&*submission.message, "I would like to order twelve cases.");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        // Arrange
        let draft = SubmissionDraft {
            name: "  Dali Ben Salah \n".into(),
            email: " dali@example.com ".into(),
            subject: "\tWholesale order".into(),
            message: " Twelve cases. ".into(),
        };

        // Act
        let submission = validate(&draft).unwrap();

        // Assert
        assert_eq!(&*submission.author.name, "Dali Ben Salah");
        assert_eq!(submission.author.email.as_str(), "dali@example.com");
        assert_eq!(&*submission.message, "Twelve cases.");
    }

    #[test]
    fn reports_all_missing_fields() {
        // Arrange
        let draft = SubmissionDraft {
            name: "   ".into(),
            ..Default::default()
        };

        // Act
        let missing = missing_fields(&draft);
        let result = validate(&draft);

        // Assert
        assert_eq!(missing, FieldName::ALL.to_vec());
        assert_eq!(
            result.unwrap_err(),
            FieldName::ALL.map(FieldError::Missing).to_vec()
        );
    }

    #[test]
    fn reports_single_missing_field() {
        // Arrange
        let draft = SubmissionDraft {
            subject: String::new(),
            ..draft()
        };

        // Act
        let result = validate(&draft);

        // Assert
        assert_eq!(
            result.unwrap_err(),
            [FieldError::Missing(FieldName::Subject)]
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for email in [
            "not-an-email",
            "two@at@signs.example",
            "missing-tld@example",
            "white space@example.com",
            "@example.com",
            "dali@",
        ] {
            // Arrange
            let draft = SubmissionDraft {
                email: email.into(),
                ..draft()
            };

            // Act
            let result = validate(&draft);

            // Assert
            assert_eq!(
                result.unwrap_err(),
                [FieldError::InvalidEmail {
                    received: email.into()
                }],
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overlong_message_with_actual_length() {
        // Arrange
        let draft = SubmissionDraft {
            message: "x".repeat(2001),
            ..draft()
        };

        // Act
        let result = validate(&draft);

        // Assert
        assert_eq!(
            result.unwrap_err(),
            [FieldError::TooLong {
                field: FieldName::Message,
                length: 2001,
                max: 2000
            }]
        );
    }

    #[test]
    fn accepts_message_at_limit() {
        // Arrange
        let draft = SubmissionDraft {
            message: "x".repeat(2000),
            ..draft()
        };

        // Act + Assert
        validate(&draft).unwrap();
    }

    #[test]
    fn rejects_overlong_name_and_subject() {
        // Arrange
        let draft = SubmissionDraft {
            name: "n".repeat(257),
            subject: "s".repeat(300),
            ..draft()
        };

        // Act
        let result = validate(&draft);

        // Assert
        assert_eq!(
            result.unwrap_err(),
            [
                FieldError::TooLong {
                    field: FieldName::Name,
                    length: 257,
                    max: 256
                },
                FieldError::TooLong {
                    field: FieldName::Subject,
                    length: 300,
                    max: 256
                }
            ]
        );
    }

    #[test]
    fn collects_errors_across_fields() {
        // Arrange
        let draft = SubmissionDraft {
            name: String::new(),
            email: "broken".into(),
            subject: "Hi".into(),
            message: "x".repeat(2500),
        };

        // Act
        let errors = validate(&draft).unwrap_err();

        // Assert
        assert_eq!(
            errors,
            [
                FieldError::Missing(FieldName::Name),
                FieldError::InvalidEmail {
                    received: "broken".into()
                },
                FieldError::TooLong {
                    field: FieldName::Message,
                    length: 2500,
                    max: 2000
                }
            ]
        );
    }

    #[test]
    fn field_name_round_trip() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
    }

    #[test]
    fn field_name_rejects_unknown_keys() {
        assert_matches!("reply_to".parse::<FieldName>(), Err(UnknownFieldError(_)));
        assert_matches!("Name".parse::<FieldName>(), Err(UnknownFieldError(_)));
    }

    #[test]
    fn draft_deserializes_with_absent_fields() {
        // Act
        let draft: SubmissionDraft = serde_json::from_str(r#"{"name": "Dali"}"#).unwrap();

        // Assert
        assert_eq!(draft.name, "Dali");
        assert_eq!(draft.email, "");
        assert_eq!(missing_fields(&draft).len(), 3);
    }

    #[test]
    fn draft_rejects_unknown_keys() {
        // Act
        let result = serde_json::from_str::<SubmissionDraft>(r#"{"Name": "Dali"}"#);

        // Assert
        assert!(result.is_err());
    }
}
