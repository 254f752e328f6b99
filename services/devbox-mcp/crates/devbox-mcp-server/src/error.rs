//! Normalized operation failures returned to MCP callers.

use thiserror::Error;

/// One failure per failed operation; the message embeds the cause.
///
/// Callers can branch on which operation failed, never on why.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("Failed to launch devbox: {0}")]
    Launch(String),

    #[error("Failed to retrieve status: {0}")]
    Status(String),

    #[error("Failed to terminate instance: {0}")]
    Terminate(String),
}
