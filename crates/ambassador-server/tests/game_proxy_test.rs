//! Integration tests for the game-packet proxy listener.
//!
//! A real TCP client talks the `<m>...</m>\0` envelope framing to a real
//! `game_listener::serve` instance, which in turn opens a real websocket
//! connection to a mock upstream server running in this test process.
//! Mirrors `lockframe-client`'s `transport_integration_test.rs`: bind to
//! `127.0.0.1:0`, read back the real address, spawn the server loop, then
//! drive it with a real client.

use std::time::Duration;

use ambassador_proto::{EnvelopedPacket, GamePacket};
use ambassador_server::game_listener;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

fn packet_with_type(type_number: u16) -> GamePacket {
    let mut data = vec![0x01, 0, 0, 0, 0, 0, 0];
    data.extend_from_slice(&type_number.to_be_bytes());
    data.extend_from_slice(&[0, 0, 0]);
    GamePacket::new(data).expect("well-formed")
}

/// Spawn a mock upstream websocket server that echoes the first binary
/// message it receives back as two packets: one whitelisted (type 20) and
/// one not (type 5). Returns its `ws://` URL.
async fn start_mock_upstream() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("ws handshake");

        let Some(Ok(Message::Binary(received))) = ws.next().await else {
            panic!("expected one binary message from the game proxy");
        };
        let forwarded = EnvelopedPacket::decode(&received).expect("decodes");
        assert_eq!(forwarded.type_number(), 99);

        ws.send(Message::Binary(EnvelopedPacket::encode(&packet_with_type(20)).to_vec()))
            .await
            .expect("send whitelisted");
        ws.send(Message::Binary(EnvelopedPacket::encode(&packet_with_type(5)).to_vec()))
            .await
            .expect("send non-whitelisted");
    });

    Url::parse(&format!("ws://{addr}")).expect("valid url")
}

/// Bind the game proxy on an ephemeral port and return its address.
async fn start_game_proxy(upstream: Url) -> std::net::SocketAddr {
    let listener = game_listener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (_tx, rx) = tokio::sync::broadcast::channel(1);

    tokio::spawn(game_listener::serve(listener, upstream, rx));

    addr
}

#[tokio::test]
async fn only_whitelisted_server_packet_reaches_the_client() {
    let upstream = start_mock_upstream().await;
    let addr = start_game_proxy(upstream).await;

    let mut stream = TcpStream::connect(addr).await.expect("connect to game proxy");

    let client_packet = packet_with_type(99);
    stream.write_all(&EnvelopedPacket::encode(&client_packet)).await.expect("write");

    let mut reader = BufReader::new(&mut stream);
    let mut frame = Vec::new();
    timeout(Duration::from_secs(5), reader.read_until(0x00, &mut frame))
        .await
        .expect("no timeout")
        .expect("read ok");

    let forwarded = EnvelopedPacket::decode(&frame).expect("decodes");
    assert_eq!(forwarded.type_number(), 20);

    // The non-whitelisted packet (type 5) must never arrive; the upstream
    // closing its side of the socket after sending both messages should
    // surface as a clean EOF on the client's read, not a second frame.
    let mut trailing = Vec::new();
    let read_more = timeout(Duration::from_secs(2), stream.read_to_end(&mut trailing)).await;
    if let Ok(Ok(n)) = read_more {
        assert_eq!(n, 0, "no further bytes expected after the whitelisted packet");
    }
}

/// Mock upstream that only ever sends the non-whitelisted packet, so the
/// client side must observe a clean close with no frame at all rather than
/// a second, filtered-out message arriving late.
async fn start_mock_upstream_non_whitelisted_only() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("ws handshake");

        let Some(Ok(Message::Binary(_))) = ws.next().await else {
            panic!("expected one binary message from the game proxy");
        };

        ws.send(Message::Binary(EnvelopedPacket::encode(&packet_with_type(5)).to_vec()))
            .await
            .expect("send non-whitelisted");
    });

    Url::parse(&format!("ws://{addr}")).expect("valid url")
}

#[tokio::test]
async fn non_whitelisted_packet_never_reaches_the_client() {
    let upstream = start_mock_upstream_non_whitelisted_only().await;
    let addr = start_game_proxy(upstream).await;

    let mut stream = TcpStream::connect(addr).await.expect("connect to game proxy");
    stream.write_all(&EnvelopedPacket::encode(&packet_with_type(99))).await.expect("write");

    let mut trailing = Vec::new();
    let read_to_eof = timeout(Duration::from_secs(5), stream.read_to_end(&mut trailing))
        .await
        .expect("no timeout")
        .expect("read ok");

    assert_eq!(read_to_eof, 0, "dropped packet must never reach the client");
}
