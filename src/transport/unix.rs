//! Unix domain socket transport.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::net::UnixStream;

use super::{BoxedStream, Transport, TransportKind};
use crate::error::Result;

/// Unix socket transport to a local MPD server.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    path: PathBuf,
}

impl UnixTransport {
    /// Create a transport for the socket at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Transport for UnixTransport {
    fn connect(&self) -> Pin<Box<dyn Future<Output = Result<BoxedStream>> + Send + '_>> {
        Box::pin(async move {
            tracing::debug!("connecting to {}", self.path.display());
            let stream = UnixStream::connect(&self.path).await?;
            Ok(Box::new(stream) as BoxedStream)
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Unix
    }

    fn address(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixListener;

    #[tokio::test]
    async fn test_unix_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpd.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"OK MPD 0.23.5\n").await.unwrap();
        });

        let stream = UnixTransport::new(&path).connect().await.unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).await.unwrap();
        assert_eq!(line, "OK MPD 0.23.5\n");
        server.await.unwrap();
    }
}
