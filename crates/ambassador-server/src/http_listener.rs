//! Reverse HTTP proxy: accepts plain HTTP on the configured listen address
//! and dispatches every request through the three cases of §6 (mobileserver,
//! main.xml, catch-all via C4 + C5).

use std::convert::Infallible;
use std::sync::Arc;

use ambassador_core::http::HTTPRequest;
use ambassador_core::pipeline::{RequestExecutor, SecureHttpPipeline};
use ambassador_core::router::{render_main_xml, PathRouter, RoutingConfiguration};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::error::ServerError;

/// Fixed literal path that returns the mobile-server discovery XML (§6).
const MOBILESERVER_PATH: &str = "/ow/mobileserver";

/// Fixed literal path that returns the rendered `main.xml` document (§6).
const MAIN_XML_PATH: &str = "/ow/static/main.xml";

/// Shared, read-only state every request handler needs.
struct HttpState<E> {
    routing: RoutingConfiguration,
    http_host: String,
    http_port: u16,
    executor: E,
}

/// Bind the HTTP listener's socket without serving it yet.
///
/// Split out from [`run`] so callers that need the actual bound address
/// (tests binding to `127.0.0.1:0`, for instance) can read
/// [`TcpListener::local_addr`] before handing the listener to [`serve`].
pub async fn bind(bind_addr: &str) -> Result<TcpListener, ServerError> {
    Ok(TcpListener::bind(bind_addr).await?)
}

/// Bind the HTTP listener and serve connections until `shutdown` fires.
///
/// Convenience wrapper around [`bind`] + [`serve`] for production callers
/// that don't need the bound address back.
pub async fn run<E>(
    bind_addr: String,
    http_host: String,
    http_port: u16,
    routing: RoutingConfiguration,
    executor: E,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), ServerError>
where
    E: RequestExecutor + Send + Sync + 'static,
{
    let listener = bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "http proxy listening");
    serve(listener, http_host, http_port, routing, executor, shutdown).await
}

/// Serve connections on an already-bound listener until `shutdown` fires.
///
/// Each accepted connection is handed to `hyper`'s HTTP/1 connection
/// builder; every request on that connection is dispatched through
/// [`handle_request`]. No connection pooling beyond what the underlying TCP
/// accept loop naturally provides, matching the "no caching" Non-goal.
pub async fn serve<E>(
    listener: TcpListener,
    http_host: String,
    http_port: u16,
    routing: RoutingConfiguration,
    executor: E,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), ServerError>
where
    E: RequestExecutor + Send + Sync + 'static,
{
    let state = Arc::new(HttpState { routing, http_host, http_port, executor });

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = accepted?;
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = hyper::service::service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(req, state).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(%peer_addr, %err, "http connection ended with error");
                    }
                });
            }
            _ = shutdown.recv() => {
                tracing::info!("http proxy shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_request<E>(
    req: Request<Incoming>,
    state: Arc<HttpState<E>>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    E: RequestExecutor,
{
    let path = req.uri().path().to_owned();

    if path == MOBILESERVER_PATH {
        let body = format!(
            r#"<xml url="http://{}:{}/ow" action="info"></xml>"#,
            state.http_host, state.http_port
        );
        return Ok(xml_response(StatusCode::OK, body));
    }

    if path == MAIN_XML_PATH {
        let body = render_main_xml(&state.http_host, state.http_port, &state.routing);
        return Ok(xml_response(StatusCode::OK, body));
    }

    let router = PathRouter::new(&state.routing);
    let Some(mut upstream_url) = router.resolve(&path) else {
        tracing::debug!(path, "no route for request path");
        return Ok(empty_response(StatusCode::NOT_FOUND));
    };
    upstream_url.set_query(req.uri().query());

    let method = req.method().as_str().to_owned();
    let headers = req
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str().to_owned(), value.to_str().unwrap_or("").to_owned()))
        .collect();

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::warn!(%err, "failed to read request body");
            return Ok(empty_response(StatusCode::BAD_REQUEST));
        },
    };

    let request = HTTPRequest { method, url: upstream_url.to_string(), headers, body };

    match SecureHttpPipeline::execute(request, &state.executor).await {
        Ok(resp) => {
            let status =
                StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut builder = Response::builder().status(status);
            for (name, value) in &resp.headers {
                builder = builder.header(name, value);
            }
            Ok(builder.body(Full::new(resp.body)).unwrap_or_else(|_| empty_response(status)))
        },
        Err(err) => {
            tracing::warn!(%err, upstream = %upstream_url, "upstream request failed");
            Ok(empty_response(StatusCode::BAD_GATEWAY))
        },
    }
}

fn xml_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/xml")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| empty_response(StatusCode::INTERNAL_SERVER_ERROR))
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder().status(status).body(Full::new(Bytes::new())).unwrap_or_else(|_| {
        let mut resp = Response::new(Full::new(Bytes::new()));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}
