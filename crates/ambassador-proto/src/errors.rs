//! Protocol error types.

use std::fmt;

/// Errors produced while encoding or decoding a game-packet envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The `<m>...</m>` envelope structure or its base64 payload was
    /// invalid (missing tags, bad base64, or fewer than 4 decoded bytes).
    MalformedEnvelope(String),

    /// The decoded payload violated a `GamePacket` invariant (too short, or
    /// a leading byte other than `0x01`).
    MalformedPacket(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEnvelope(msg) => write!(f, "malformed envelope: {msg}"),
            Self::MalformedPacket(msg) => write!(f, "malformed packet: {msg}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;
