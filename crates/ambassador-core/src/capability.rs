//! Capability traits injected into a [`crate::session::GameProxySession`].
//!
//! Mirrors the teacher's `Environment`-style abstraction: protocol logic
//! here never touches a concrete socket type, only these traits. Production
//! code in `ambassador-server` implements them over a raw TCP stream and
//! over a websocket; tests implement them over an in-memory channel.

use std::future::Future;

use ambassador_proto::{GamePacket, Result as ProtoResult};

/// Reads whole [`GamePacket`]s one at a time from some underlying
/// transport (a raw byte stream with NUL framing, or a websocket
/// delivering one envelope per binary message).
pub trait PacketReader: Send {
    /// Read and decode the next packet.
    ///
    /// `Ok(None)` signals a clean end-of-stream with no partial envelope
    /// pending. `Ok(Some(Err(_)))` signals a malformed envelope or packet;
    /// the caller should close the session, not retry. `Err(_)` is an I/O
    /// failure on the underlying transport.
    fn read_packet(
        &mut self,
    ) -> impl Future<Output = std::io::Result<Option<ProtoResult<GamePacket>>>> + Send;
}

/// Writes whole [`GamePacket`]s one at a time to some underlying transport.
pub trait PacketWriter: Send {
    /// Encode and write one packet.
    fn write_packet(
        &mut self,
        packet: &GamePacket,
    ) -> impl Future<Output = std::io::Result<()>> + Send;
}
