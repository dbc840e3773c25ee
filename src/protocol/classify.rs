//! Error classifier: maps each inbound line to the outcome it has in the
//! state that received it.

use super::line::Line;
use crate::error::{JukeboxError, Result};

/// Outcome of one line received during an idle wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleStep {
    /// `changed: <system>`; keep waiting
    Changed(String),
    /// Bare `OK`; the idle is over
    Done,
}

/// Parse the greeting and return the server's protocol version.
pub fn greeting(raw: &str) -> Result<String> {
    match Line::parse(raw) {
        Line::Greeting(version) => Ok(version),
        _ => Err(JukeboxError::HandshakeFailure(raw.to_string())),
    }
}

/// Classify the single reply line of a plain command.
///
/// `OK…` is success, `ACK…` is a recoverable rejection carrying the full
/// line, anything else is fatal. A greeting-shaped `OK MPD …` reply still
/// starts with `OK`.
pub fn reply(raw: &str) -> Result<()> {
    match Line::parse(raw) {
        Line::Ok(_) | Line::Greeting(_) => Ok(()),
        Line::Ack(text) => Err(JukeboxError::CommandRejected(text)),
        _ => Err(unexpected(raw)),
    }
}

/// Classify a line received while an idle is outstanding.
pub fn idle(raw: &str) -> Result<IdleStep> {
    let line = Line::parse(raw);
    if line.is_bare_ok() {
        return Ok(IdleStep::Done);
    }
    match line {
        Line::Changed(system) => Ok(IdleStep::Changed(system)),
        _ => Err(unexpected(raw)),
    }
}

/// A line that has no place in the current state.
pub fn unexpected(raw: &str) -> JukeboxError {
    JukeboxError::ProtocolViolation(format!("unexpected response {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    #[test]
    fn test_greeting_version_verbatim() {
        assert_eq!(greeting("OK MPD 0.21.5").unwrap(), "0.21.5");
        let err = greeting("HELLO").unwrap_err();
        assert!(matches!(err, JukeboxError::HandshakeFailure(_)));
        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[test]
    fn test_reply() {
        assert!(reply("OK").is_ok());
        assert!(reply("OK list_OK").is_ok());
        assert!(reply("OK MPD whatever").is_ok());

        let err = reply("ACK [50@0] {add} problem").unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("problem"));

        let err = reply("changed: player").unwrap_err();
        assert!(matches!(err, JukeboxError::ProtocolViolation(_)));
    }

    #[test]
    fn test_idle_lines() {
        assert_eq!(
            idle("changed: mixer").unwrap(),
            IdleStep::Changed("mixer".to_string())
        );
        assert_eq!(idle("OK").unwrap(), IdleStep::Done);
        // Only a bare OK ends an idle
        assert!(idle("OK MPD 0.21.5").is_err());
        assert!(idle("ACK [5@0] {idle} nope").is_err());
    }
}
