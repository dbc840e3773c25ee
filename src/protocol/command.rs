//! Commands queued for the session control task.

use std::fmt;

use tokio::sync::oneshot;

use crate::error::Result;

/// Known command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// `add <uri>`
    Add,
    /// `idle [subsystems]`
    Idle,
    /// `noidle`, cancels an outstanding idle
    NoIdle,
    /// Anything the session does not service
    Other(String),
}

impl CommandKind {
    /// Wire name of the command.
    pub fn name(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Idle => "idle",
            Self::NoIdle => "noidle",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for CommandKind {
    fn from(name: &str) -> Self {
        match name {
            "add" => Self::Add,
            "idle" => Self::Idle,
            "noidle" => Self::NoIdle,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A caller request together with its completion signal.
///
/// [`Command::complete`] consumes the command, so the signal can be fulfilled
/// at most once. Dropping an uncompleted command closes the signal, which
/// the waiting caller observes as `SessionClosed`.
#[derive(Debug)]
pub struct Command {
    /// Command name
    pub kind: CommandKind,
    /// Opaque parameter payload
    pub params: String,
    done: oneshot::Sender<Result<()>>,
}

impl Command {
    /// Create a command and the receiver its caller waits on.
    pub fn new(name: &str, params: &str) -> (Self, oneshot::Receiver<Result<()>>) {
        let (done, rx) = oneshot::channel();
        let cmd = Self {
            kind: CommandKind::from(name),
            params: params.to_string(),
            done,
        };
        (cmd, rx)
    }

    /// Text written to the transport, without the newline.
    pub fn wire(&self) -> String {
        if self.params.is_empty() {
            self.kind.name().to_string()
        } else {
            format!("{} {}", self.kind, self.params)
        }
    }

    /// Fulfill the completion signal.
    pub fn complete(self, result: Result<()>) {
        // The caller may have given up waiting
        if self.done.send(result).is_err() {
            tracing::debug!("caller of {} went away before completion", self.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JukeboxError;

    #[test]
    fn test_wire_format() {
        let (add, _rx) = Command::new("add", "\"X\"");
        assert_eq!(add.kind, CommandKind::Add);
        assert_eq!(add.wire(), "add \"X\"");

        let (noidle, _rx) = Command::new("noidle", "");
        assert_eq!(noidle.kind, CommandKind::NoIdle);
        assert_eq!(noidle.wire(), "noidle");

        let (other, _rx) = Command::new("status", "");
        assert_eq!(other.kind, CommandKind::Other("status".to_string()));
    }

    #[tokio::test]
    async fn test_complete_delivers_once() {
        let (cmd, rx) = Command::new("add", "x");
        cmd.complete(Err(JukeboxError::CommandRejected("ACK".to_string())));
        let result = rx.await.unwrap();
        assert!(matches!(result, Err(JukeboxError::CommandRejected(_))));
    }

    #[tokio::test]
    async fn test_dropped_command_closes_signal() {
        let (cmd, rx) = Command::new("add", "x");
        drop(cmd);
        assert!(rx.await.is_err());
    }
}
