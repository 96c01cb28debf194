use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors for queue operations
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    #[error("Queue not declared: {0}")]
    QueueNotDeclared(String),

    #[error("Invalid queue name: {0:?}")]
    InvalidQueueName(String),

    #[error("Invalid lease token")]
    InvalidLeaseToken,

    #[error("Codec not found: {0}")]
    CodecNotFound(String),

    #[error("Payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
