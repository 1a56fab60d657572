//! Concrete [`PacketReader`]/[`PacketWriter`] implementations over a raw TCP
//! client stream and over the upstream websocket.

use ambassador_core::capability::{PacketReader, PacketWriter};
use ambassador_proto::{EnvelopeReader, EnvelopedPacket, GamePacket, Result as ProtoResult};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Reads NUL-terminated envelopes off the client-facing raw TCP stream
/// (§4.1 "Framing on a raw byte stream").
pub struct TcpPacketReader {
    inner: EnvelopeReader<BufReader<OwnedReadHalf>>,
}

impl TcpPacketReader {
    /// Wrap the read half of an accepted client connection.
    #[must_use]
    pub fn new(read_half: OwnedReadHalf) -> Self {
        Self { inner: EnvelopeReader::new(BufReader::new(read_half)) }
    }
}

impl PacketReader for TcpPacketReader {
    async fn read_packet(&mut self) -> std::io::Result<Option<ProtoResult<GamePacket>>> {
        self.inner.read_packet().await
    }
}

/// Writes envelopes to the client-facing raw TCP stream.
pub struct TcpPacketWriter {
    inner: OwnedWriteHalf,
}

impl TcpPacketWriter {
    /// Wrap the write half of an accepted client connection.
    #[must_use]
    pub fn new(write_half: OwnedWriteHalf) -> Self {
        Self { inner: write_half }
    }
}

impl PacketWriter for TcpPacketWriter {
    async fn write_packet(&mut self, packet: &GamePacket) -> std::io::Result<()> {
        let encoded = EnvelopedPacket::encode(packet);
        self.inner.write_all(&encoded).await
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Reads one envelope per binary websocket message from the upstream game
/// server (§4.1: "on a websocket channel, each received binary message is
/// one whole envelope").
pub struct WebSocketPacketReader {
    inner: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketPacketReader {
    /// Wrap the receiving half of an upstream websocket connection.
    #[must_use]
    pub fn new(inner: futures_util::stream::SplitStream<WsStream>) -> Self {
        Self { inner }
    }
}

impl PacketReader for WebSocketPacketReader {
    async fn read_packet(&mut self) -> std::io::Result<Option<ProtoResult<GamePacket>>> {
        loop {
            match self.inner.next().await {
                None => return Ok(None),
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(Some(EnvelopedPacket::decode(&bytes)));
                },
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    return Err(std::io::Error::other(err.to_string()));
                },
            }
        }
    }
}

/// Writes envelopes as binary websocket messages to the upstream game
/// server.
pub struct WebSocketPacketWriter {
    inner: futures_util::stream::SplitSink<WsStream, Message>,
}

impl WebSocketPacketWriter {
    /// Wrap the sending half of an upstream websocket connection.
    #[must_use]
    pub fn new(inner: futures_util::stream::SplitSink<WsStream, Message>) -> Self {
        Self { inner }
    }
}

impl PacketWriter for WebSocketPacketWriter {
    async fn write_packet(&mut self, packet: &GamePacket) -> std::io::Result<()> {
        let encoded = EnvelopedPacket::encode(packet);
        self.inner
            .send(Message::Binary(encoded.to_vec()))
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))
    }
}
