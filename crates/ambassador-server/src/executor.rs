//! The production [`RequestExecutor`]: forwards a request to its upstream
//! origin over `hyper` and materializes the full response body (§9 Open
//! Question 5: forward all four `HTTPRequest` fields, not just method and
//! URL).

use ambassador_core::http::{HTTPRequest, HTTPResponse};
use ambassador_core::pipeline::{ExecutorError, RequestExecutor};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

type LegacyClient = Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>;

/// A shared upstream HTTP client, safe under concurrent use (§5 Shared
/// resources: "the request executor is shared... but must itself be safe
/// under concurrent use").
pub struct HyperRequestExecutor {
    client: LegacyClient,
}

impl HyperRequestExecutor {
    /// Build a new executor over a plain-HTTP `hyper-util` legacy client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::builder(TokioExecutor::new()).build_http() }
    }
}

impl Default for HyperRequestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestExecutor for HyperRequestExecutor {
    async fn execute(&self, req: HTTPRequest) -> Result<HTTPResponse, ExecutorError> {
        let method = req
            .method
            .parse::<hyper::Method>()
            .map_err(|e| ExecutorError(format!("invalid method '{}': {e}", req.method)))?;

        let mut builder = hyper::Request::builder().method(method).uri(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        let body = Full::new(Bytes::copy_from_slice(&req.body));
        let request = builder
            .body(body)
            .map_err(|e| ExecutorError(format!("failed to build request: {e}")))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ExecutorError(format!("request to {} failed: {e}", req.url)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or("").to_owned()))
            .collect();

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ExecutorError(format!("failed to read response body: {e}")))?;
        let body = collected.to_bytes();

        Ok(HTTPResponse { status, headers, body })
    }
}
