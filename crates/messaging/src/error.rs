use thiserror::Error;

/// Errors that can occur when publishing an event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The transport refused or lost the message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A message was built without a required field.
    #[error("Invalid message: {0} is required")]
    MissingField(&'static str),

    /// The payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for publishing operations.
pub type Result<T> = std::result::Result<T, PublishError>;
