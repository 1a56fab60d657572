//! Wire codec for the ambassador game-packet envelope.
//!
//! This crate is the sole owner of the on-wire format described by the
//! security boundary: a length-prefixed, base64-encoded, XML-tag-wrapped,
//! null-terminated envelope around a fixed-shape binary payload. It has no
//! knowledge of sockets, sessions, or HTTP; those live in
//! `ambassador-core` and `ambassador-server`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod errors;
mod packet;
mod reader;

pub use envelope::EnvelopedPacket;
pub use errors::{ProtocolError, Result};
pub use packet::GamePacket;
pub use reader::EnvelopeReader;
