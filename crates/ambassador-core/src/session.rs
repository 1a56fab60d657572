//! Game proxy session: the per-connection two-way packet pump (C6).

use std::fmt;

use ambassador_proto::ProtocolError;

use crate::capability::{PacketReader, PacketWriter};

/// Server→client packet types this session is permitted to forward.
///
/// Fixed in code, not configured. See §3 `GameProxySession` and §4.6.
pub const SERVER_TO_CLIENT_WHITELIST: &[u16] = &[20];

/// Session lifecycle states (§3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Upstream websocket handshake has not yet completed.
    Opening,
    /// Both pumps are running.
    Running,
    /// Either direction has closed or failed; both pumps have been
    /// cancelled and all owned sockets released.
    Closed,
}

/// Reasons a session transitioned to [`SessionState::Closed`].
#[derive(Debug)]
pub enum SessionError {
    /// The client-facing reader or writer failed.
    ClientIo(String),
    /// The upstream reader or writer failed.
    UpstreamIo(String),
    /// An envelope could not be parsed (§7 `MalformedEnvelope`).
    MalformedEnvelope(String),
    /// A decoded payload violated `GamePacket`'s invariants (§7
    /// `MalformedPacket`).
    MalformedPacket(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientIo(msg) => write!(f, "client transport error: {msg}"),
            Self::UpstreamIo(msg) => write!(f, "upstream transport error: {msg}"),
            Self::MalformedEnvelope(msg) => write!(f, "malformed envelope: {msg}"),
            Self::MalformedPacket(msg) => write!(f, "malformed packet: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MalformedEnvelope(msg) => Self::MalformedEnvelope(msg),
            ProtocolError::MalformedPacket(msg) => Self::MalformedPacket(msg),
        }
    }
}

/// Per-connection session pairing a client byte stream with an upstream
/// websocket.
///
/// Generic over the four capability halves so that production code can plug
/// in a raw TCP reader/writer and a websocket reader/writer, while tests
/// plug in in-memory channels. No trait objects, no inheritance, matching
/// the teacher's generic-driver pattern.
pub struct GameProxySession<CR, CW, UR, UW> {
    client_reader: CR,
    client_writer: CW,
    upstream_reader: UR,
    upstream_writer: UW,
}

impl<CR, CW, UR, UW> GameProxySession<CR, CW, UR, UW>
where
    CR: PacketReader + 'static,
    CW: PacketWriter + 'static,
    UR: PacketReader + 'static,
    UW: PacketWriter + 'static,
{
    /// Pair up the four capability halves for a new connection.
    ///
    /// Callers are expected to have already completed the upstream
    /// websocket handshake (the `Opening -> Running` transition of §4.6)
    /// before constructing this session.
    pub fn new(client_reader: CR, client_writer: CW, upstream_reader: UR, upstream_writer: UW) -> Self {
        Self { client_reader, client_writer, upstream_reader, upstream_writer }
    }

    /// Run both pumps until either direction closes or fails.
    ///
    /// Packet order within a single direction is preserved (each packet is
    /// fully read, then fully forwarded, before the next is read). The two
    /// directions are independent; whichever pump finishes first implicitly
    /// cancels the other, since `tokio::select!` drops the losing future at
    /// its current suspension point, satisfying the `Running -> Closed`
    /// cancellation requirement of §5 without extra bookkeeping.
    pub async fn run(self) -> Result<(), SessionError> {
        let Self { mut client_reader, mut client_writer, mut upstream_reader, mut upstream_writer } =
            self;

        let client_to_upstream = async move {
            loop {
                match client_reader.read_packet().await {
                    Ok(Some(Ok(packet))) => {
                        upstream_writer
                            .write_packet(&packet)
                            .await
                            .map_err(|e| SessionError::UpstreamIo(e.to_string()))?;
                    },
                    Ok(Some(Err(e))) => return Err(SessionError::from(e)),
                    Ok(None) => return Ok(()),
                    Err(e) => return Err(SessionError::ClientIo(e.to_string())),
                }
            }
        };

        let upstream_to_client = async move {
            loop {
                match upstream_reader.read_packet().await {
                    Ok(Some(Ok(packet))) => {
                        if SERVER_TO_CLIENT_WHITELIST.contains(&packet.type_number()) {
                            client_writer
                                .write_packet(&packet)
                                .await
                                .map_err(|e| SessionError::ClientIo(e.to_string()))?;
                        } else {
                            tracing::debug!(
                                type_number = packet.type_number(),
                                "dropping non-whitelisted server packet"
                            );
                        }
                    },
                    Ok(Some(Err(e))) => return Err(SessionError::from(e)),
                    Ok(None) => return Ok(()),
                    Err(e) => return Err(SessionError::UpstreamIo(e.to_string())),
                }
            }
        };

        tokio::select! {
            res = client_to_upstream => res,
            res = upstream_to_client => res,
        }
    }
}
