use thiserror::Error;

/// Errors that can occur while publishing or handling domain events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventBusError {
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Event handler failed: {0}")]
    HandlerFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, EventBusError>;
