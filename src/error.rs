//! Defines the ways an invocation of the relay can fail.

use thiserror::Error;

/// An unrecoverable failure that aborts the current invocation.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to parse upload event: {0}")]
    Parse(String),

    #[error("The relay was not configured with a queue to poll")]
    NoQueue,

    #[error("Failed to receive messages from SQS: {0}")]
    Receive(String),

    #[error("Failed to delete messages from SQS: {0}")]
    Delete(String),

    #[error("Failed to publish message to SNS: {0}")]
    Publish(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::Parse(error.to_string())
    }
}
