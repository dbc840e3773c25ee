//! Line reader task.
//!
//! Republishes every line read from the transport on an unbounded channel.
//! When the stream ends or a read fails the task returns and the channel
//! closes; the session treats the closed channel as a broken connection.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawn the reader on the read half of a transport.
pub fn spawn_reader<R>(reader: R) -> (mpsc::UnboundedReceiver<String>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(read_lines(reader, tx));
    (rx, handle)
}

async fn read_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracing::debug!("<- {}", line);
                if tx.send(line).is_err() {
                    // Session is gone, nobody to hand lines to
                    return;
                }
            },
            Ok(None) => {
                tracing::debug!("server closed the stream");
                return;
            },
            Err(e) => {
                tracing::warn!("read error: {}", e);
                return;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_lines_in_order_then_closed() {
        let (client, mut server) = tokio::io::duplex(64);
        let (mut rx, handle) = spawn_reader(client);

        server
            .write_all(b"OK MPD 0.21.5\nchanged: player\r\nOK\n")
            .await
            .unwrap();
        drop(server);

        assert_eq!(rx.recv().await.as_deref(), Some("OK MPD 0.21.5"));
        assert_eq!(rx.recv().await.as_deref(), Some("changed: player"));
        assert_eq!(rx.recv().await.as_deref(), Some("OK"));
        assert_eq!(rx.recv().await, None);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_line_is_flushed_at_eof() {
        let (client, mut server) = tokio::io::duplex(64);
        let (mut rx, _handle) = spawn_reader(client);

        server.write_all(b"OK").await.unwrap();
        drop(server);

        assert_eq!(rx.recv().await.as_deref(), Some("OK"));
        assert_eq!(rx.recv().await, None);
    }
}
