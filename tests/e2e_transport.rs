//! End-to-end transport tests.
//!
//! These tests run a session over a real TCP connection to a fake MPD
//! server bound on an ephemeral port.

use std::time::Duration;

use jukebox::config::ConnectionConfig;
use jukebox::transport::{self, TcpTransport, Transport, TransportKind};
use jukebox::{Player, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Accept one client, greet it, answer each command with OK and
/// return the lines it wrote.
async fn fake_mpd(listener: TcpListener) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_half.write_all(b"OK MPD 0.23.5\n").await.unwrap();

    let mut received = Vec::new();
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        write_half.write_all(b"OK\n").await.unwrap();
        received.push(line);
    }
    received
}

#[tokio::test]
async fn test_tcp_session_add() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(fake_mpd(listener));

    let transport = TcpTransport::localhost(port).with_timeout(Duration::from_secs(5));
    let stream = transport.connect().await.unwrap();
    let session = Session::connect(stream).await.unwrap();
    assert_eq!(session.version(), Some("0.23.5"));

    Player::add(&session, "\"The Mothers of Invention\"")
        .await
        .unwrap();
    session.add("song.flac").await.unwrap();
    drop(session);

    let received = timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
    assert_eq!(
        received,
        vec!["add \"The Mothers of Invention\"", "add song.flac"]
    );
}

#[tokio::test]
async fn test_transport_from_config() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(fake_mpd(listener));

    let config = ConnectionConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..Default::default()
    };
    let transport = transport::from_config(&config);
    assert_eq!(transport.kind(), TransportKind::Tcp);

    let session = Session::connect(transport.connect().await.unwrap())
        .await
        .unwrap();
    assert_eq!(session.version(), Some("0.23.5"));
    drop(session);

    let received = timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
    assert!(received.is_empty());
}
