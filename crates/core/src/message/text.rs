use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MessageError, Result};

/// Maximum number of characters a message may carry.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Validated message body.
///
/// Holds text that is not blank and at most [`MAX_TEXT_LENGTH`] characters
/// long. Length is measured in Unicode scalar values, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageText(String);

impl MessageText {
    /// Validates and wraps the given text.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MessageError::EmptyText);
        }
        let len = text.chars().count();
        if len > MAX_TEXT_LENGTH {
            return Err(MessageError::TextTooLong { len });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the text.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<String> for MessageText {
    type Error = MessageError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<MessageText> for String {
    fn from(text: MessageText) -> Self {
        text.0
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
