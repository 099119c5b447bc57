//! gh-relay: reverse proxy for GitHub releases, archives, raw files,
//! gists and git smart-HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http server ─▶ dispatcher ─▶ routing          │
//!                             │   (request id,    (preflight,   (classify,        │
//!                             │    trace,          ?q=,          rewrite)         │
//!                             │    timeout)        allow-list)      │           │
//!                             │                                     ▼           │
//!     Client Response         │                               proxy engine ────┼──▶ GitHub /
//!     ◀───────────────────────┼── sanitize headers ◀── redirect resolution ◀───┼─── asset origin
//!                             └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gh_relay::config::RelayConfig;
use gh_relay::http::HttpServer;
use gh_relay::lifecycle::startup::{resolve_config, Overrides};
use gh_relay::lifecycle::Shutdown;
use gh_relay::net::tls::load_tls_config;
use gh_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gh-relay")]
#[command(about = "Reverse proxy that relays GitHub downloads with CORS enabled", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override relay.prefix (must start and end with '/').
    #[arg(short, long)]
    prefix: Option<String>,

    /// Redirect blob and raw-content requests to the CDN mirror.
    #[arg(long)]
    mirror: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        bind_address: cli.bind,
        prefix: cli.prefix,
        mirror_mode: cli.mirror,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability);
    tracing::info!("gh-relay v{} starting", env!("CARGO_PKG_VERSION"));
    log_config(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_config(config: &RelayConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        prefix = %config.relay.prefix,
        asset_url = %config.relay.asset_url,
        mirror_mode = config.relay.mirror_mode,
        allow_list_entries = config.relay.allow_list.len(),
        max_redirects = config.relay.max_redirects,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
}
