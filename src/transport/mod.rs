//! Transport layer for reaching an MPD server.
//!
//! A session only needs a duplex byte stream. This module opens one:
//! - **TCP**: `host:port`, the usual MPD setup
//! - **Unix socket**: local servers configured with a socket path
//!
//! # Usage
//!
//! ```rust,ignore
//! use jukebox::{config::ConnectionConfig, transport, Session};
//!
//! let transport = transport::from_config(&ConnectionConfig::default());
//! let stream = transport.connect().await?;
//! let session = Session::connect(stream).await?;
//! ```

mod tcp;
#[cfg(unix)]
mod unix;

pub use tcp::TcpTransport;
#[cfg(unix)]
pub use unix::UnixTransport;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ConnectionConfig;
use crate::error::Result;

/// Any stream a session can run on.
pub trait DuplexStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> DuplexStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// Type-erased connection returned by [`Transport::connect`].
pub type BoxedStream = Box<dyn DuplexStream>;

/// Transport kind selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// TCP (default)
    #[default]
    Tcp,
    /// Unix domain socket
    Unix,
}

impl TransportKind {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Unix => "Unix",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "unix" | "socket" => Ok(Self::Unix),
            _ => Err(format!("Unknown transport kind: {}", s)),
        }
    }
}

/// Transport trait for pluggable connection backends.
pub trait Transport: Send + Sync {
    /// Open a new connection.
    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<BoxedStream>> + Send + '_>>;

    /// Get the transport kind.
    fn kind(&self) -> TransportKind;

    /// Get the server address as a string.
    fn address(&self) -> String;
}

/// Pick the transport matching a connection config.
pub fn from_config(config: &ConnectionConfig) -> Box<dyn Transport> {
    #[cfg(unix)]
    if config.is_unix_socket() {
        return Box::new(UnixTransport::new(&config.host));
    }

    let mut transport = TcpTransport::new(config.address());
    if config.connect_timeout_secs > 0 {
        transport = transport.with_timeout(Duration::from_secs(config.connect_timeout_secs));
    }
    Box::new(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transport_kind_from_str() {
        assert_eq!(TransportKind::from_str("tcp").unwrap(), TransportKind::Tcp);
        assert_eq!(TransportKind::from_str("UNIX").unwrap(), TransportKind::Unix);
        assert!(TransportKind::from_str("quic").is_err());
    }

    #[test]
    fn test_transport_kind_default() {
        assert_eq!(TransportKind::default(), TransportKind::Tcp);
        assert_eq!(TransportKind::default().to_string(), "TCP");
    }

    #[test]
    fn test_from_config_tcp() {
        let transport = from_config(&ConnectionConfig::default());
        assert_eq!(transport.kind(), TransportKind::Tcp);
        assert_eq!(transport.address(), "127.0.0.1:6600");
    }

    #[cfg(unix)]
    #[test]
    fn test_from_config_unix() {
        let config = ConnectionConfig {
            host: "/run/mpd/socket".to_string(),
            ..Default::default()
        };
        let transport = from_config(&config);
        assert_eq!(transport.kind(), TransportKind::Unix);
        assert_eq!(transport.address(), "/run/mpd/socket");
    }
}
