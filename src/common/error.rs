use std::io;

use thiserror::Error;

/// Errors surfaced by the chat core.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Message body was empty; rejected before any store or network effect
    #[error("message content is empty")]
    EmptyContent,

    /// Malformed request or wire payload
    #[error("decode failure: {0}")]
    Decode(String),

    /// The overlay refused or failed to publish
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Dialing a discovered peer failed
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Audit log could not be opened or written
    #[error("audit log I/O: {0}")]
    FatalIo(#[from] io::Error),

    /// Swarm construction or listen failure at startup
    #[error("network error: {0}")]
    Network(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}
