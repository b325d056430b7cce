use thiserror::Error;

use crate::sync::SyncError;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Card not found on the board: {0}")]
    CardNotFound(String),

    #[error("Dropzone not found: {0}")]
    DropzoneNotFound(String),

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Invalid status label: {0:?}")]
    InvalidStatus(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Page error: {0}")]
    Page(String),
}
