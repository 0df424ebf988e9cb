use thiserror::Error;
use uuid::Uuid;

use missive_core::message::MessageError;
use missive_core::storage::RepositoryError;

/// Outcome of a failed service operation.
///
/// Validation, not-found and conflict failures are distinct variants so
/// callers must handle them; store failures are wrapped as `Storage`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Message not found: {0}")]
    NotFound(Uuid),
    #[error("Message already exists: {0}")]
    AlreadyExists(Uuid),
    #[error("Invalid message text: {0}")]
    InvalidText(MessageError),
    #[error("Validation failed: {0}")]
    Validation(MessageError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<MessageError> for ServiceError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::EmptyText | MessageError::TextTooLong { .. } => Self::InvalidText(err),
            other => Self::Validation(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
