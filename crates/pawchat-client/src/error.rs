use thiserror::Error;

use pawchat_shared::HandleError;

/// Errors surfaced by the conversation core.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The handle does not belong to anyone. Terminal for this open attempt.
    #[error("No user with handle '{0}'")]
    NotFound(String),

    /// Any network or server failure. Recoverable by retrying.
    #[error("Transient error: {0}")]
    Transient(#[from] TransportError),

    #[error("Invalid handle: {0}")]
    InvalidHandle(#[from] HandleError),

    #[error("Message text is empty")]
    EmptyText,

    #[error("Message too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("Cannot open a conversation with yourself")]
    SelfConversation,

    #[error("Conversation is closed")]
    Closed,
}

impl ChatError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ChatError::Transient(_))
    }
}

/// Failures of the HTTP boundary.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {status} body={body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChatError>;
