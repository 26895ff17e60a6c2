//! ETI router server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    ETI ROUTER                     │
//!     Remote call      │  ┌─────────┐    ┌───────────┐    ┌────────────┐  │
//!     ─────────────────┼─▶│  http   │───▶│  calling  │───▶│  routing   │  │
//!                      │  │ server  │    │  parser   │    │  Router    │  │
//!                      │  └─────────┘    └───────────┘    └─────┬──────┘  │
//!                      │                                        ▼         │
//!                      │                                 ┌────────────┐   │
//!     JSON / notice    │  ┌──────────┐                   │  registry  │   │
//!     ◀────────────────┼──│ response │◀──────────────────│  methods + │   │
//!                      │  └──────────┘                   │  classes   │   │
//!                      │                                 └────────────┘   │
//!                      │  lifecycle (paths, config, db) · escalation ·    │
//!                      │  observability                                   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use eti_router::db::MySqlConnector;
use eti_router::lifecycle::signals::spawn_signal_listener;
use eti_router::observability::{logging, metrics};
use eti_router::registry::builtin;
use eti_router::{AppOptions, Bootstrap, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "eti-router")]
#[command(about = "Boot an application and serve its remote calls", long_about = None)]
struct Args {
    /// Installation root holding config/, lib/, app/, tmp/, cache/ and log/
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Application under <base>/app/
    #[arg(long, default_value = "admin")]
    app: String,

    /// Explicit application root, bypassing <base>/app/<app>/
    #[arg(long)]
    app_root: Option<PathBuf>,

    /// Bind address; overrides listener.bind_address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let log_handle = logging::init();

    tracing::info!("eti-router v{} starting", env!("CARGO_PKG_VERSION"));

    let options = AppOptions {
        base_path: args.base_path,
        app_name: args.app,
        app_root: args.app_root,
    };

    let router = match Bootstrap::new(options)
        .methods(builtin::demo_methods())
        .log_handle(log_handle)
        .run(&MySqlConnector)
        .await
    {
        Ok(router) => Arc::new(router),
        Err(e) => {
            tracing::error!(state = %e.state, error = %e.fault, "Bootstrap halted");
            eprintln!("{}", e.notice.message);
            std::process::exit(1);
        }
    };

    let config = router.config();
    tracing::info!(
        web_root = %config.web_root,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind = args.bind.unwrap_or_else(|| config.listener.bind_address.clone());
    let listener = TcpListener::bind(&bind).await?;

    let shutdown = Shutdown::new();
    let signals = spawn_signal_listener(shutdown.clone());

    HttpServer::new(router.clone()).run(listener, shutdown.subscribe()).await?;

    signals.abort();
    router.db().close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
