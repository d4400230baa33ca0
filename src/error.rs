//! Error types for the chat client.

use thiserror::Error;

/// Repository and message-construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Chatroom not found: {0}")]
    ChatroomNotFound(String),
    #[error("Chat title is required")]
    InvalidTitle,
    #[error("Message must have text or an image")]
    EmptyMessage,
}

/// Errors from the key-value storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the (simulated) remote services.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid OTP")]
    InvalidCode,
    #[error("Assistant returned an empty reply")]
    EmptyReply,
    #[error("Please select an image file (got {0})")]
    UnsupportedAttachment(String),
    #[error("Image size must be less than 5MB (got {size} bytes)")]
    AttachmentTooLarge { size: u64 },
    #[error("Failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Field-level validation failure, carrying the message shown next to the field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Top-level error for the binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please log in first (run `login`)")]
    NotAuthenticated,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
