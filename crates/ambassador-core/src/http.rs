//! HTTP request/response value types shared between the pipeline and its
//! injected executor (§3 Data Model).

use bytes::Bytes;

/// An upstream HTTP request as the pipeline hands it to a
/// [`crate::pipeline::RequestExecutor`].
///
/// Headers preserve the case they were received in; the executor sends them
/// verbatim. Owned by the caller until the executor returns.
#[derive(Debug, Clone)]
pub struct HTTPRequest {
    /// HTTP method, used verbatim (no validation or normalization).
    pub method: String,
    /// Absolute upstream URL to request.
    pub url: String,
    /// Header name to single value, insertion order preserved.
    pub headers: Vec<(String, String)>,
    /// Opaque request body.
    pub body: Bytes,
}

/// An HTTP response as returned by the executor and, after processing, by
/// the pipeline.
///
/// Headers are a name/value list in receipt order, not a map: §4.5's
/// canonicalization algorithm is order-sensitive ("iterate in insertion
/// order", "first occurrence wins"), which a hash map cannot represent.
///
/// Freshly allocated by [`crate::pipeline::SecureHttpPipeline::execute`];
/// independent of the executor's own buffers after return.
#[derive(Debug, Clone)]
pub struct HTTPResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header name to single value, in receipt order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl HTTPResponse {
    /// The fixed block response of §6: `403`, no headers, body
    /// `b"bad swf blocked"`.
    #[must_use]
    pub fn blocked() -> Self {
        Self { status: 403, headers: Vec::new(), body: Bytes::from_static(b"bad swf blocked") }
    }

    /// Look up a header by exact name match.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}
