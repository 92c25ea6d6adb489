//! Development proxy binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                  DEV PROXY                      │
//!    Client Request    │  ┌─────────┐    ┌──────────┐    ┌───────────┐  │
//!    ──────────────────┼─▶│  http   │───▶│ routing  │───▶│ dispatch  │──┼──▶ Service
//!    (Host: a.b.root)  │  │ server  │    │ (Host →  │    │ + entry   │  │    process
//!                      │  └─────────┘    │ decision)│    │ point hdr │  │
//!                      │                 └────▲─────┘    └───────────┘  │
//!                      │                      │ snapshot                 │
//!                      │  ┌─────────┐    ┌────┴─────┐                   │
//!                      │  │ config  │───▶│ session  │ (rebuilt on edit) │
//!                      │  │ watcher │    │  build   │                   │
//!                      │  └─────────┘    └──────────┘                   │
//!                      └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use devhost_router::config::{load_config, watcher::ConfigWatcher};
use devhost_router::observability::{logging, metrics};
use devhost_router::{HttpServer, Session, SessionHandle, Shutdown};

#[derive(Parser)]
#[command(name = "devhost-router")]
#[command(about = "Local development proxy with per-entry-point virtual hosts", long_about = None)]
struct Cli {
    /// Path to the session configuration file.
    #[arg(short, long, default_value = "devhost.toml")]
    config: PathBuf,

    /// Rebuild the routing table when the config file changes.
    #[arg(short, long)]
    watch: bool,

    /// Print every addressable host and exit.
    #[arg(long)]
    print_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!("devhost-router v{} starting", env!("CARGO_PKG_VERSION"));

    let session = Session::build(&config)?;

    for (host, target) in session.table().hostnames() {
        tracing::info!(host = %host, target = %target, "Route");
    }
    if cli.print_routes {
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher must outlive the server for reloads to keep flowing.
    let (updates, _watcher) = if cli.watch {
        let (watcher, updates) = ConfigWatcher::new(&cli.config);
        (updates, Some(watcher.run()?))
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (updates, None)
    };

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().trigger_on_ctrl_c());

    let server = HttpServer::new(&config, SessionHandle::new(session));
    server.run(listener, updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
