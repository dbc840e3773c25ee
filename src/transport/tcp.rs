//! TCP transport implementation.
//!
//! Plain TCP to `host:port`. MPD listens on port 6600 by default.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;

use super::{BoxedStream, Transport, TransportKind};
use crate::error::{JukeboxError, Result};
use crate::protocol::DEFAULT_PORT;

/// TCP transport to an MPD server.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    /// `host:port` to connect to.
    address: String,
    /// Give up connecting after this long.
    timeout: Option<Duration>,
}

impl TcpTransport {
    /// Create a new TCP transport.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: None,
        }
    }

    /// Create with localhost address.
    pub fn localhost(port: u16) -> Self {
        Self::new(format!("127.0.0.1:{port}"))
    }

    /// Bound the time spent connecting.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn open(&self) -> Result<TcpStream> {
        let stream = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, TcpStream::connect(&self.address))
                .await
                .map_err(|_| {
                    JukeboxError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("connecting to {} timed out", self.address),
                    ))
                })??,
            None => TcpStream::connect(&self.address).await?,
        };
        // Commands are single short lines
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::localhost(DEFAULT_PORT)
    }
}

impl Transport for TcpTransport {
    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<BoxedStream>> + Send + '_>> {
        Box::pin(async move {
            tracing::debug!("connecting to {} over TCP", self.address);
            let stream = self.open().await?;
            Ok(Box::new(stream) as BoxedStream)
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Tcp
    }

    fn address(&self) -> String {
        self.address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_transport_default() {
        let transport = TcpTransport::default();
        assert_eq!(transport.address(), "127.0.0.1:6600");
        assert_eq!(transport.kind(), TransportKind::Tcp);
        assert!(transport.timeout.is_none());
    }

    #[test]
    fn test_tcp_transport_localhost() {
        let transport = TcpTransport::localhost(3000).with_timeout(Duration::from_secs(2));
        assert_eq!(transport.address(), "127.0.0.1:3000");
        assert_eq!(transport.timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_tcp_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpTransport::localhost(port).connect().await;
        assert!(matches!(result, Err(JukeboxError::Io(_))));
    }
}
