//! Jukebox error types.
//!
//! # Severity
//!
//! Every error carries a [`Severity`]:
//!
//! - **Recoverable**: the server rejected one command with an `ACK` line.
//!   Only that command fails, the session keeps running.
//! - **Fatal**: the byte stream no longer follows the protocol grammar, the
//!   connection broke, or the caller broke the idle contract. The session
//!   stops servicing commands for good.
//!
//! `CallerMisuse` is fatal like a protocol fault but points at the caller,
//! not the server: it is raised when anything other than `noidle` is
//! submitted while an `idle` is outstanding.

use thiserror::Error;

/// How far an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Scoped to a single command; the session stays usable.
    Recoverable,
    /// The session is permanently disabled.
    Fatal,
}

/// Jukebox errors.
#[derive(Error, Debug)]
pub enum JukeboxError {
    /// Greeting line did not match `OK MPD <version>`.
    #[error("Handshake failed: unexpected greeting {0:?}")]
    HandshakeFailure(String),

    /// Server answered a command with an `ACK` line (full line preserved).
    #[error("Command rejected: {0}")]
    CommandRejected(String),

    /// Inbound line inconsistent with the grammar expected in the current state.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A command other than `noidle` was submitted while idling.
    #[error("Caller misuse: {0}")]
    CallerMisuse(String),

    /// Server closed the connection or the read side failed.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// The session already reached its terminal state.
    #[error("Session closed")]
    SessionClosed,

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JukeboxError {
    /// Classify this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::CommandRejected(_) => Severity::Recoverable,
            Self::HandshakeFailure(_)
            | Self::ProtocolViolation(_)
            | Self::CallerMisuse(_)
            | Self::ConnectionClosed
            | Self::SessionClosed
            | Self::Io(_) => Severity::Fatal,
            // Raised before a session exists
            Self::Config(_) => Severity::Fatal,
        }
    }

    /// Whether the session survives this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() == Severity::Recoverable
    }
}

/// Result type alias for jukebox operations
pub type Result<T> = std::result::Result<T, JukeboxError>;

impl From<toml::de::Error> for JukeboxError {
    fn from(err: toml::de::Error) -> Self {
        JukeboxError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ack_is_recoverable() {
        assert!(JukeboxError::CommandRejected("ACK [50@0] {add} x".to_string()).is_recoverable());
        assert!(!JukeboxError::ProtocolViolation("?".to_string()).is_recoverable());
        assert!(!JukeboxError::CallerMisuse("add".to_string()).is_recoverable());
        assert_eq!(JukeboxError::ConnectionClosed.severity(), Severity::Fatal);
        assert_eq!(JukeboxError::SessionClosed.severity(), Severity::Fatal);
    }

    #[test]
    fn test_rejection_keeps_server_text() {
        let err = JukeboxError::CommandRejected("ACK [50@0] {add} problem".to_string());
        assert!(err.to_string().contains("problem"));
    }
}
