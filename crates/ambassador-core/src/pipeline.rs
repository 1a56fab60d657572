//! Secure HTTP request pipeline (C5): header canonicalization, hop-encoding
//! stripping, SWF gate, block decision.

use std::fmt;
use std::future::Future;

use crate::http::{HTTPRequest, HTTPResponse};
use crate::swf::{decompress_swf, is_swf, scan_blacklist, SwfError};

/// Performs a single upstream HTTP request.
///
/// Injected into [`SecureHttpPipeline`] so the pure pipeline logic never
/// depends on a concrete HTTP client, mirroring the teacher's
/// `Environment`-style capability injection. Implementations must be safe
/// under concurrent use, since one executor instance is shared across all
/// requests (§5 Shared resources).
pub trait RequestExecutor: Send + Sync {
    /// Send `req` upstream and return the raw response.
    fn execute(
        &self,
        req: HTTPRequest,
    ) -> impl Future<Output = Result<HTTPResponse, ExecutorError>> + Send;
}

/// Failure performing the upstream request (§7 `UpstreamFailure`).
#[derive(Debug)]
pub struct ExecutorError(pub String);

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream request failed: {}", self.0)
    }
}

impl std::error::Error for ExecutorError {}

/// Hop-by-hop response headers stripped after canonicalization (§4.5 step
/// 3), by their Title-Case names.
const STRIPPED_HEADERS: &[&str] = &["Content-Encoding", "Transfer-Encoding"];

/// Orchestrates one HTTP request through the security-sensitive pipeline.
///
/// Stateless: every method call is independent, matching §5's "HTTP
/// requests are independent; no ordering across requests."
pub struct SecureHttpPipeline;

impl SecureHttpPipeline {
    /// Run `req` through the executor and the full pipeline (§4.5 steps
    /// 1-5).
    pub async fn execute(
        req: HTTPRequest,
        executor: &impl RequestExecutor,
    ) -> Result<HTTPResponse, ExecutorError> {
        let resp = executor.execute(req).await?;

        let headers: Vec<(String, String)> = canonicalize_ordered_headers(&resp.headers)
            .into_iter()
            .filter(|(name, _)| !STRIPPED_HEADERS.contains(&name.as_str()))
            .collect();

        if is_swf(&resp.body) {
            match decompress_swf(&resp.body) {
                Ok(decompressed) => {
                    if scan_blacklist(&decompressed, None).is_empty() {
                        return Ok(HTTPResponse { status: resp.status, headers, body: resp.body });
                    }
                    tracing::warn!("blocking response: blacklisted library string in SWF body");
                    return Ok(HTTPResponse::blocked());
                },
                Err(SwfError::UnrecognizedMagic | SwfError::TruncatedHeader | SwfError::DecompressionFailed(_)) => {
                    tracing::warn!("blocking response: malformed SWF header or stream");
                    return Ok(HTTPResponse::blocked());
                },
            }
        }

        Ok(HTTPResponse { status: resp.status, headers, body: resp.body })
    }
}

/// Title-Case a header name: the first letter and every letter following a
/// `-` are uppercased, all others lowercased (§4.5 step 2).
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize_next = true;
    for ch in name.chars() {
        if capitalize_next {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        capitalize_next = ch == '-';
    }
    out
}

/// Canonicalize a header list in insertion order (§4.5 step 2):
/// Title-Case each name, keep only the first occurrence of each resulting
/// name.
#[must_use]
pub fn canonicalize_ordered_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for (name, value) in headers {
        let canonical = title_case(name);
        if !out.iter().any(|(existing, _)| *existing == canonical) {
            out.push((canonical, value.clone()));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use bytes::Bytes;

    use super::*;

    struct FixedExecutor(HTTPResponse);

    impl RequestExecutor for FixedExecutor {
        async fn execute(&self, _req: HTTPRequest) -> Result<HTTPResponse, ExecutorError> {
            Ok(self.0.clone())
        }
    }

    fn request() -> HTTPRequest {
        HTTPRequest {
            method: "GET".to_owned(),
            url: "http://example.com/thing".to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    #[test]
    fn title_case_matches_spec_example() {
        assert_eq!(title_case("header-name"), "Header-Name");
        assert_eq!(title_case("HeAder-NaMe"), "Header-Name");
    }

    #[test]
    fn ordered_header_canonicalization_first_occurrence_wins() {
        let headers = vec![
            ("header-name".to_owned(), "a".to_owned()),
            ("HeAder-NaMe".to_owned(), "b".to_owned()),
        ];
        let canonical = canonicalize_ordered_headers(&headers);
        assert_eq!(canonical, vec![("Header-Name".to_owned(), "a".to_owned())]);
    }

    #[tokio::test]
    async fn strips_content_and_transfer_encoding() {
        let headers = vec![
            ("content-encoding".to_owned(), "gzip".to_owned()),
            ("transfer-encoding".to_owned(), "chunked".to_owned()),
            ("x-custom".to_owned(), "value".to_owned()),
        ];

        let executor =
            FixedExecutor(HTTPResponse { status: 200, headers, body: Bytes::from_static(b"hello") });

        let resp = SecureHttpPipeline::execute(request(), &executor).await.expect("ok");
        assert!(resp.header("Content-Encoding").is_none());
        assert!(resp.header("Transfer-Encoding").is_none());
        assert_eq!(resp.header("X-Custom"), Some("value"));
        assert_eq!(&resp.body[..], b"hello");
    }

    #[tokio::test]
    async fn swf_with_blacklisted_string_is_blocked() {
        let mut payload = vec![b'F', b'W', b'S', 0x06, 0, 0, 0, 0];
        payload.extend_from_slice(b"references flash.filesystem here");

        let executor =
            FixedExecutor(HTTPResponse { status: 200, headers: Vec::new(), body: Bytes::from(payload) });

        let resp = SecureHttpPipeline::execute(request(), &executor).await.expect("ok");
        assert_eq!(resp.status, 403);
        assert!(resp.headers.is_empty());
        assert_eq!(&resp.body[..], b"bad swf blocked");
    }

    #[tokio::test]
    async fn non_swf_body_passes_through_unchanged() {
        let body = Bytes::from_static(b"just some html");
        let executor =
            FixedExecutor(HTTPResponse { status: 200, headers: Vec::new(), body: body.clone() });

        let resp = SecureHttpPipeline::execute(request(), &executor).await.expect("ok");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, body);
    }

    #[tokio::test]
    async fn malformed_swf_header_is_blocked() {
        let executor = FixedExecutor(HTTPResponse {
            status: 200,
            headers: Vec::new(),
            body: Bytes::from_static(b"FWS"),
        });

        let resp = SecureHttpPipeline::execute(request(), &executor).await.expect("ok");
        assert_eq!(resp.status, 403);
        assert_eq!(&resp.body[..], b"bad swf blocked");
    }
}
