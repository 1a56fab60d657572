//! The `GamePacket` value type.

use bytes::Bytes;

use crate::errors::{ProtocolError, Result};

/// An immutable game packet payload.
///
/// # Invariants
///
/// - `len(data) >= 13`
/// - `data[0] == 0x01`
///
/// These are enforced by [`GamePacket::new`]; there is no other way to
/// construct one. The type number (§3 `type_number`) is derived, not stored,
/// so it can never drift from the bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePacket {
    data: Bytes,
}

impl GamePacket {
    /// Minimum payload length, including the leading tag byte and the
    /// 2-byte type number at offset 7.
    pub const MIN_LEN: usize = 13;

    /// The leading byte every valid payload must carry.
    pub const LEADING_BYTE: u8 = 0x01;

    /// Construct a `GamePacket` from its raw payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedPacket`] if `data` is shorter than
    /// [`Self::MIN_LEN`] or does not begin with [`Self::LEADING_BYTE`].
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();

        if data.len() < Self::MIN_LEN {
            return Err(ProtocolError::MalformedPacket(format!(
                "payload length {} below minimum {}",
                data.len(),
                Self::MIN_LEN
            )));
        }

        if data[0] != Self::LEADING_BYTE {
            return Err(ProtocolError::MalformedPacket(format!(
                "leading byte 0x{:02x}, expected 0x{:02x}",
                data[0],
                Self::LEADING_BYTE
            )));
        }

        Ok(Self { data })
    }

    /// The 16-bit big-endian type number at payload offset 7.
    #[must_use]
    pub fn type_number(&self) -> u16 {
        u16::from_be_bytes([self.data[7], self.data[8]])
    }

    /// Borrow the raw payload bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the packet, returning the owned payload bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}
