//! Ambassador server binary: runs the game-packet proxy and the reverse
//! HTTP proxy side by side, sharing configuration and process lifetime
//! (§2 "Ambassador: the process as a whole").
//!
//! # Usage
//!
//! ```bash
//! ambassador-server --config ambassador.ini
//! ```

use ambassador_server::{ServerError, game_listener, http_listener, HyperRequestExecutor};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Ambassador: a protective local intermediary for a legacy game client.
#[derive(Parser, Debug)]
#[command(name = "ambassador-server")]
#[command(about = "Game-packet and reverse-HTTP proxy ambassador")]
#[command(version)]
struct Args {
    /// Path to the INI configuration file (§6 Configuration file).
    #[arg(short, long, default_value = "ambassador.ini")]
    config: String,

    /// Override the game proxy listen address from the config file.
    #[arg(long)]
    game_bind: Option<String>,

    /// Override the HTTP proxy listen address from the config file.
    #[arg(long)]
    http_bind: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("ambassador server starting");

    let config = ambassador_config::AmbassadorConfig::load(&args.config)?;

    let game_bind = args
        .game_bind
        .unwrap_or_else(|| format!("{}:{}", config.listen.game_host, config.listen.game_port));
    let http_bind = args
        .http_bind
        .unwrap_or_else(|| format!("{}:{}", config.listen.http_host, config.listen.http_port));

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let game_task = tokio::spawn(game_listener::run(
        game_bind,
        config.forwarding.upstream_game_websocket,
        shutdown_tx.subscribe(),
    ));

    let http_task = tokio::spawn(http_listener::run(
        http_bind,
        config.listen.http_host,
        config.listen.http_port,
        config.routing,
        HyperRequestExecutor::new(),
        shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("received ctrl-c, shutting down");
    let _ = shutdown_tx.send(());

    let (game_result, http_result) = tokio::join!(game_task, http_task);
    game_result.map_err(|e| ServerError::Transport(e.to_string()))??;
    http_result.map_err(|e| ServerError::Transport(e.to_string()))??;

    Ok(())
}
