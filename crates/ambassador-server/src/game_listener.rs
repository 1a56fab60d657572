//! Game-packet proxy: TCP accept loop, one upstream websocket and one
//! [`GameProxySession`] per accepted connection.

use ambassador_core::GameProxySession;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::error::ServerError;
use crate::transport::{TcpPacketReader, TcpPacketWriter, WebSocketPacketReader, WebSocketPacketWriter};

/// Bind the game-packet listener and accept connections until `shutdown`
/// fires.
///
/// Each accepted connection opens its own upstream websocket (no pooling,
/// per §6 "one websocket per client session") and runs independently; one
/// session's failure never affects another's (§8 Concurrency property).
pub async fn run(
    bind_addr: String,
    upstream_game_websocket: Url,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), ServerError> {
    let listener = bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "game proxy listening");
    serve(listener, upstream_game_websocket, shutdown).await
}

/// Bind the game-packet listener's socket without serving it yet.
///
/// Split out from [`run`] so callers that need the actual bound address
/// (tests binding to `127.0.0.1:0`, for instance) can read
/// [`TcpListener::local_addr`] before handing the listener to [`serve`].
pub async fn bind(bind_addr: &str) -> Result<TcpListener, ServerError> {
    Ok(TcpListener::bind(bind_addr).await?)
}

/// Accept connections on an already-bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    upstream_game_websocket: Url,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), ServerError> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = accepted?;
                let upstream_url = upstream_game_websocket.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, upstream_url).await {
                        tracing::warn!(%peer_addr, %err, "game session closed with error");
                    }
                });
            }
            _ = shutdown.recv() => {
                tracing::info!("game proxy shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, upstream_url: Url) -> Result<(), ServerError> {
    let (upstream_stream, _response) = tokio_tungstenite::connect_async(upstream_url.as_str())
        .await
        .map_err(|e| ServerError::Transport(format!("upstream websocket handshake failed: {e}")))?;

    let (upstream_sink, upstream_stream) = upstream_stream.split();
    let upstream_reader = WebSocketPacketReader::new(upstream_stream);
    let upstream_writer = WebSocketPacketWriter::new(upstream_sink);

    let (client_read, client_write) = stream.into_split();
    let client_reader = TcpPacketReader::new(client_read);
    let client_writer = TcpPacketWriter::new(client_write);

    let session = GameProxySession::new(client_reader, client_writer, upstream_reader, upstream_writer);

    session.run().await.map_err(|e| ServerError::Transport(e.to_string()))
}
