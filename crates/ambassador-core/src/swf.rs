//! SWF decompression (C2) and library-string scanning (C3).

use std::fmt;

use bytes::Bytes;

/// The 8-byte fixed header every SWF body carries (3-byte magic, 1-byte
/// version, 4-byte file length) before the payload proper.
const FIXED_HEADER_LEN: usize = 8;

/// LZMA properties block length inside a `ZWS` body.
const LZMA_PROPS_LEN: usize = 5;

/// Bytes after the fixed header in a `ZWS` body that hold the stored
/// uncompressed size, skipped before the LZMA properties.
const ZWS_SIZE_FIELD_LEN: usize = 4;

/// Fixed list of lowercase substrings that classify a decompressed SWF body
/// as dangerous (§3 Blacklist). A compile-time constant: do not make this
/// configurable without a security review, since it is the last line of
/// defense against a broadened set of dangerous symbols.
pub const BLACKLIST: &[&str] = &[
    "flash.net",
    "flash.filesystem",
    "flash.external",
    "flash.html",
    "flash.desktop",
    "flash.system",
    "loader",
    "getdefinitionbyname",
];

/// Errors from SWF header parsing or decompression.
#[derive(Debug)]
pub enum SwfError {
    /// The body does not begin with one of the three recognized magic
    /// signatures (`FWS`, `CWS`, `ZWS`).
    UnrecognizedMagic,
    /// The body is shorter than the 8-byte fixed header requires, or (for
    /// `ZWS`) shorter than the additional size/properties fields require.
    TruncatedHeader,
    /// The compressed stream itself failed to decompress.
    DecompressionFailed(String),
}

impl fmt::Display for SwfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedMagic => write!(f, "body does not start with a known SWF magic"),
            Self::TruncatedHeader => write!(f, "SWF header is truncated"),
            Self::DecompressionFailed(msg) => write!(f, "SWF decompression failed: {msg}"),
        }
    }
}

impl std::error::Error for SwfError {}

/// Does `body` begin with a recognized SWF magic (`FWS`/`CWS`/`ZWS`)?
#[must_use]
pub fn is_swf(body: &[u8]) -> bool {
    body.len() >= 3 && matches!(&body[..3], b"FWS" | b"CWS" | b"ZWS")
}

/// Decompress a SWF body (§4.2), returning the payload following the fixed
/// header, uncompressed regardless of original compression.
///
/// # Errors
///
/// [`SwfError::UnrecognizedMagic`] if `body` does not start with `FWS`,
/// `CWS`, or `ZWS`. [`SwfError::TruncatedHeader`] if `body` is shorter than
/// the header fields it claims to have. [`SwfError::DecompressionFailed`] if
/// the compressed stream itself is invalid.
pub fn decompress_swf(body: &[u8]) -> Result<Bytes, SwfError> {
    if body.len() < 3 {
        return Err(SwfError::UnrecognizedMagic);
    }

    match &body[..3] {
        b"FWS" => {
            if body.len() < FIXED_HEADER_LEN {
                return Err(SwfError::TruncatedHeader);
            }
            Ok(Bytes::copy_from_slice(&body[FIXED_HEADER_LEN..]))
        },
        b"CWS" => {
            if body.len() < FIXED_HEADER_LEN {
                return Err(SwfError::TruncatedHeader);
            }
            decompress_zlib(&body[FIXED_HEADER_LEN..])
        },
        b"ZWS" => decompress_lzma(body),
        _ => Err(SwfError::UnrecognizedMagic),
    }
}

fn decompress_zlib(compressed: &[u8]) -> Result<Bytes, SwfError> {
    use std::io::Read as _;

    use flate2::read::ZlibDecoder;

    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SwfError::DecompressionFailed(e.to_string()))?;
    Ok(Bytes::from(out))
}

/// Decode a `ZWS` body.
///
/// Layout after the 8-byte fixed header: 4 bytes of stored uncompressed size
/// (ignored here), then a 5-byte LZMA properties block, then the raw LZMA
/// compressed stream. `lzma-rs` expects a standard LZMA1 stream (properties
/// + 8-byte "unknown size" marker + compressed data), so we synthesize that
/// marker per §4.2 rather than relying on the stored size field.
fn decompress_lzma(body: &[u8]) -> Result<Bytes, SwfError> {
    let header_end = FIXED_HEADER_LEN + ZWS_SIZE_FIELD_LEN + LZMA_PROPS_LEN;
    if body.len() < header_end {
        return Err(SwfError::TruncatedHeader);
    }

    let props = &body[FIXED_HEADER_LEN + ZWS_SIZE_FIELD_LEN..header_end];
    let compressed_tail = &body[header_end..];

    let mut synthesized = Vec::with_capacity(props.len() + 8 + compressed_tail.len());
    synthesized.extend_from_slice(props);
    synthesized.extend_from_slice(&[0xFFu8; 8]);
    synthesized.extend_from_slice(compressed_tail);

    let mut out = Vec::new();
    lzma_rs::lzma_decompress(&mut &synthesized[..], &mut out)
        .map_err(|e| SwfError::DecompressionFailed(e.to_string()))?;

    Ok(Bytes::from(out))
}

/// Case-insensitive substring scan of `decompressed` against [`BLACKLIST`]
/// (§4.3). Returns matched strings in blacklist order, stopping early once
/// `max_findings` hits have been collected.
#[must_use]
pub fn scan_blacklist(decompressed: &[u8], max_findings: Option<usize>) -> Vec<&'static str> {
    let lowered = ascii_lowercase(decompressed);
    let mut matches = Vec::new();

    for &needle in BLACKLIST {
        if contains_bytes(&lowered, needle.as_bytes()) {
            matches.push(needle);
            if max_findings.is_some_and(|max| matches.len() >= max) {
                break;
            }
        }
    }

    matches
}

fn ascii_lowercase(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(u8::to_ascii_lowercase).collect()
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return needle.is_empty();
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fws_body(payload: &[u8]) -> Vec<u8> {
        let mut body = vec![b'F', b'W', b'S', 0x06];
        body.extend_from_slice(&(8 + payload.len() as u32).to_le_bytes());
        body.extend_from_slice(payload);
        body
    }

    #[test]
    fn fws_strips_fixed_header_only() {
        let payload = b"hello swf tags";
        let body = fws_body(payload);
        let decompressed = decompress_swf(&body).expect("decompresses");
        assert_eq!(&decompressed[..], payload);
    }

    #[test]
    fn unknown_magic_is_rejected() {
        let body = b"XYZ1234567890";
        assert!(matches!(decompress_swf(body), Err(SwfError::UnrecognizedMagic)));
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(matches!(decompress_swf(b"FWS"), Err(SwfError::TruncatedHeader)));
    }

    #[test]
    fn blacklist_scan_is_case_insensitive() {
        let body = b"this references FLASH.filesystem somewhere";
        let matches = scan_blacklist(body, None);
        assert_eq!(matches, vec!["flash.filesystem"]);
    }

    #[test]
    fn blacklist_scan_finds_all_matches_in_order() {
        let body = b"flash.net and loader and getDefinitionByName all present";
        let matches = scan_blacklist(body, None);
        assert_eq!(matches, vec!["flash.net", "loader", "getdefinitionbyname"]);
    }

    #[test]
    fn blacklist_scan_respects_max_findings() {
        let body = b"flash.net flash.filesystem flash.external";
        let matches = scan_blacklist(body, Some(1));
        assert_eq!(matches, vec!["flash.net"]);
    }

    #[test]
    fn blacklist_scan_empty_on_clean_body() {
        let body = b"just some regular swf tag bytes";
        assert!(scan_blacklist(body, None).is_empty());
    }

    #[test]
    fn is_swf_recognizes_all_three_magics() {
        assert!(is_swf(b"FWS\x06"));
        assert!(is_swf(b"CWS\x06"));
        assert!(is_swf(b"ZWS\x06"));
        assert!(!is_swf(b"PNG\x06"));
        assert!(!is_swf(b"F"));
    }
}
