//! # Jukebox - MPD client sessions
//!
//! Async client for the MPD (Music Player Daemon) control protocol, built
//! around a session state machine that keeps strictly one command in flight
//! while supporting the server-pushed `idle` wait.
//!
//! ## Features
//!
//! - **Greeting handshake**: parses `OK MPD <version>` and stores the version
//! - **Sequential commands**: many callers, one command on the wire at a time
//! - **Idle / noidle**: wait for subsystem changes, cancel from another task
//! - **Fault classification**: `ACK` replies are recoverable, grammar
//!   violations end the session
//! - **Transports**: TCP or unix socket, or any `AsyncRead + AsyncWrite`
//!
//! ## Architecture
//!
//! ```text
//!  callers ──submit()──> command queue ──┐
//!                                        v
//!                               [session control task] ──write──> transport
//!                                        ^                            │
//!  lines <── [reader task] <──read───────┴────────────────────────────┘
//! ```
//!
//! Each command carries a one-shot completion signal that the control task
//! fulfills exactly once.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jukebox::{transport, Config, Session};
//!
//! let config = Config::load(None)?;
//! let stream = transport::from_config(&config.connection).connect().await?;
//! let session = Session::connect(stream).await?;
//!
//! session.add("\"The Mothers of Invention\"").await?;
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Session state machine, line classification
//! - [`transport`]: TCP and unix socket connections
//! - [`player`]: Player abstraction
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod player;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use config::Config;
pub use error::{JukeboxError, Result, Severity};
pub use player::Player;
pub use protocol::{IdleEvent, Session, SessionStatus, State};
pub use transport::{TcpTransport, Transport, TransportKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
