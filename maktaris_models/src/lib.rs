use nutype::nutype;

pub mod email_address;
pub mod submission;

/// Opaque identifier assigned to an email accepted for delivery.
#[nutype(derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Deref,
    From,
    Serialize,
    Deserialize,
))]
pub struct MessageId(String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&**self, f)
    }
}

impl MessageId {
    pub fn as_str(&self) -> &str {
        self
    }
}
