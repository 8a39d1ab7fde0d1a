use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webchat_rs::registry::config::DEFAULT_SUBSCRIBER_BUFFER;
use webchat_rs::server::config::{DEFAULT_ASSET_ROOT, DEFAULT_PORT};
use webchat_rs::{ChatServer, ServerConfig};

/// Real-time chat broadcast server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Directory to serve static files from
    #[arg(long, default_value = DEFAULT_ASSET_ROOT)]
    web_root: PathBuf,

    /// Events buffered per subscriber before it is dropped
    #[arg(long, default_value_t = DEFAULT_SUBSCRIBER_BUFFER)]
    buffer: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,webchat_rs=debug"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    if !args.web_root.is_dir() {
        tracing::warn!(
            web_root = %args.web_root.display(),
            "Asset directory not found, static requests will return 404"
        );
    }

    let config = ServerConfig::default()
        .bind(args.bind)
        .asset_root(args.web_root)
        .subscriber_buffer(args.buffer);

    ChatServer::new(config).run_until(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
