//! Null-terminated envelope framing over a raw byte stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{envelope::EnvelopedPacket, errors::Result, packet::GamePacket};

/// Reads one [`GamePacket`] at a time from a raw, null-terminated byte
/// stream (§4.1 framing).
///
/// Each call to [`Self::read_packet`] consumes bytes up to and including the
/// next NUL byte and parses everything before it as one envelope. This is
/// the framing used for the client-facing TCP stream; the upstream
/// websocket instead gets one whole envelope per binary message and does
/// not need this reader.
pub struct EnvelopeReader<R> {
    inner: R,
    scratch: Vec<u8>,
}

impl<R> EnvelopeReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self { inner, scratch: Vec::new() }
    }

    /// Read and decode the next envelope.
    ///
    /// Returns `Ok(None)` on clean end-of-stream before any bytes of a new
    /// envelope were read. A partial envelope followed by end-of-stream is
    /// reported as an error, not as `None`.
    pub async fn read_packet(&mut self) -> std::io::Result<Option<Result<GamePacket>>> {
        self.scratch.clear();

        let bytes_read = self.inner.read_until(0x00, &mut self.scratch).await?;
        if bytes_read == 0 {
            return Ok(None);
        }

        // Drop the trailing NUL, if present, before handing to the codec;
        // decode() also accepts a buffer that still has it since it scans
        // for </m> rather than relying on the terminator.
        Ok(Some(EnvelopedPacket::decode(&self.scratch)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tokio::io::BufReader;

    use super::*;
    use crate::envelope::EnvelopedPacket;

    fn packet_with_type(type_number: u16) -> GamePacket {
        let mut data = vec![0x01, 0, 0, 0, 0, 0, 0];
        data.extend_from_slice(&type_number.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0]);
        GamePacket::new(data).expect("well-formed")
    }

    #[tokio::test]
    async fn reads_two_sequential_envelopes() {
        let a = packet_with_type(1);
        let b = packet_with_type(2);

        let mut wire = Vec::new();
        wire.extend_from_slice(&EnvelopedPacket::encode(&a));
        wire.extend_from_slice(&EnvelopedPacket::encode(&b));

        let mut reader = EnvelopeReader::new(BufReader::new(&wire[..]));

        let first = reader.read_packet().await.expect("io ok").expect("some").expect("decodes");
        assert_eq!(first, a);

        let second = reader.read_packet().await.expect("io ok").expect("some").expect("decodes");
        assert_eq!(second, b);

        let end = reader.read_packet().await.expect("io ok");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn clean_eof_with_no_bytes_yields_none() {
        let wire: Vec<u8> = Vec::new();
        let mut reader = EnvelopeReader::new(BufReader::new(&wire[..]));
        assert!(reader.read_packet().await.expect("io ok").is_none());
    }
}
