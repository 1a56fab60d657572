//! The on-wire envelope: `<m>base64(be32(len) || payload)</m>[\0]`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    errors::{ProtocolError, Result},
    packet::GamePacket,
};

const OPEN_TAG: &[u8] = b"<m>";
const CLOSE_TAG: &[u8] = b"</m>";
const NUL: u8 = 0x00;

/// Encodes and decodes the enveloped wire form of a [`GamePacket`].
pub struct EnvelopedPacket;

impl EnvelopedPacket {
    /// Produce the enveloped bytes for `packet`.
    ///
    /// Always ends with a single NUL terminator, per §4.1.
    #[must_use]
    pub fn encode(packet: &GamePacket) -> Bytes {
        let payload = packet.data();

        #[allow(clippy::cast_possible_truncation)]
        let len_prefix = (payload.len() as u32).to_be_bytes();

        let mut inner = BytesMut::with_capacity(4 + payload.len());
        inner.put_slice(&len_prefix);
        inner.put_slice(payload);

        let encoded = BASE64.encode(&inner);

        let mut out = BytesMut::with_capacity(
            OPEN_TAG.len() + encoded.len() + CLOSE_TAG.len() + 1,
        );
        out.put_slice(OPEN_TAG);
        out.put_slice(encoded.as_bytes());
        out.put_slice(CLOSE_TAG);
        out.put_u8(NUL);

        out.freeze()
    }

    /// Decode one envelope from `buf`.
    ///
    /// Locates the first `<m>`, takes bytes up to the first subsequent
    /// `</m>`, base64-decodes that region, and constructs a [`GamePacket`]
    /// from everything after the 4-byte length prefix. The length prefix is
    /// not cross-checked against the remaining byte count (§9 Open
    /// Question 1). This is baseline behavior, not an oversight.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::MalformedEnvelope`] if the tags are missing, the
    /// base64 is invalid, or the decoded region is shorter than 4 bytes.
    /// [`ProtocolError::MalformedPacket`] if the remaining bytes fail
    /// [`GamePacket`]'s invariants.
    pub fn decode(buf: &[u8]) -> Result<GamePacket> {
        let open_at = find(buf, OPEN_TAG)
            .ok_or_else(|| ProtocolError::MalformedEnvelope("missing <m> open tag".to_string()))?;
        let body_start = open_at + OPEN_TAG.len();

        let close_at = find(&buf[body_start..], CLOSE_TAG).ok_or_else(|| {
            ProtocolError::MalformedEnvelope("missing </m> close tag".to_string())
        })?;
        let body_end = body_start + close_at;

        let decoded = BASE64.decode(&buf[body_start..body_end]).map_err(|e| {
            ProtocolError::MalformedEnvelope(format!("invalid base64: {e}"))
        })?;

        if decoded.len() < 4 {
            return Err(ProtocolError::MalformedEnvelope(format!(
                "decoded region is {} bytes, need at least 4 for the length prefix",
                decoded.len()
            )));
        }

        // The length prefix is intentionally not re-verified here; see
        // module docs and §9 Open Question 1.
        let payload = Bytes::copy_from_slice(&decoded[4..]);

        GamePacket::new(payload)
    }
}

/// Find the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
