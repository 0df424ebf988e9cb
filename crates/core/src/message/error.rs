use thiserror::Error;

/// Invariant violations raised by the `Message` aggregate and its value objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message text cannot be empty")]
    EmptyText,
    #[error("Message text is too long: {len} characters")]
    TextTooLong { len: usize },
    #[error("Sender ID cannot be empty")]
    MissingSenderId,
    #[error("Recipient ID cannot be empty")]
    MissingRecipientId,
    #[error("Chat ID cannot be empty")]
    MissingChatId,
    #[error("Cannot send message to yourself")]
    SelfAddressed,
    #[error("Cannot edit deleted message")]
    CannotEditDeleted,
    #[error("Cannot read deleted message")]
    CannotReadDeleted,
    #[error("Deleted message cannot be marked as read")]
    DeletedMessageCannotBeRead,
}

/// Result type for aggregate operations.
pub type Result<T> = std::result::Result<T, MessageError>;
