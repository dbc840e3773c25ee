//! MPD protocol session management.
//!
//! Implements the client side of the MPD control protocol: a greeting
//! handshake, strictly sequential request/response commands, and the
//! long-lived `idle` wait that the caller can cancel with `noidle`.
//!
//! # Protocol Overview
//!
//! The server speaks first. Every command is one line; the reply ends with
//! an `OK` line on success or a single `ACK` line on failure.
//!
//! ## Message Flow
//!
//! ```text
//! Client                            Server
//!    |                                |
//!    |<------ OK MPD 0.21.5 ----------|  Greeting
//!    |                                |
//!    |-------- add "X" ------------->|  Command
//!    |<------- OK -------------------|  or ACK [50@0] {add} ...
//!    |                                |
//!    |-------- idle player --------->|  Wait for events
//!    |<------- changed: player ------|  zero or more
//!    |<------- OK -------------------|  idle over
//!    |                                |
//!    |-------- idle ---------------->|
//!    |-------- noidle -------------->|  Caller cancels
//! ```
//!
//! ## State Machine
//!
//! | State        | Description                          | Valid Transitions |
//! |--------------|--------------------------------------|-------------------|
//! | `Connecting` | Waiting for the greeting             | → Ready, Fatal    |
//! | `Ready`      | Waiting for the next command         | → Ready, Fatal    |
//! | `Fatal`      | Protocol broken, nothing is serviced | (terminal)        |
//! | `Closed`     | All handles dropped                  | (terminal)        |
//!
//! Handling a command happens inside `Ready` and always resolves back to
//! `Ready` or to `Fatal`.
//!
//! ## Faults
//!
//! | Error               | Severity    | Cause                                   |
//! |---------------------|-------------|-----------------------------------------|
//! | `CommandRejected`   | Recoverable | `ACK` reply to a command                |
//! | `HandshakeFailure`  | Fatal       | Greeting is not `OK MPD <version>`      |
//! | `ProtocolViolation` | Fatal       | Line does not fit the current state     |
//! | `CallerMisuse`      | Fatal       | Command other than `noidle` while idling |
//! | `ConnectionClosed`  | Fatal       | Stream ended or a read failed           |
//!
//! # Usage
//!
//! ```rust,ignore
//! use jukebox::protocol::Session;
//!
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:6600").await?;
//! let session = Session::connect(stream).await?;
//! println!("MPD {}", session.version().unwrap_or("?"));
//!
//! session.add("\"The Mothers of Invention\"").await?;
//!
//! let mut events = session.take_events().unwrap();
//! session.idle(&["player"]).await?;
//! println!("changed: {:?}", events.recv().await);
//! ```

mod classify;
mod command;
mod line;
mod reader;
mod session;

pub use classify::IdleStep;
pub use command::CommandKind;
pub use line::Line;
pub use session::{IdleEvent, Session, SessionStatus, State};

/// Default MPD port
pub const DEFAULT_PORT: u16 = 6600;
