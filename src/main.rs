//! record-ingest service binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!   POST /api/receive│                 RECORD INGEST                 │
//!  ──────────────────┼─▶┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!                    │  │  http    │──▶│ handlers │──▶│  store    │  │
//!   GET  /api/...    │  │  server  │   │          │   │ (RwLock)  │  │
//!  ◀─────────────────┼──└──────────┘◀──└──────────┘◀──└───────────┘  │
//!                    │                                               │
//!                    │  config · observability · security · lifecycle│
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use record_ingest::config::{load_config, validate_config, ServiceConfig};
use record_ingest::lifecycle::{signals, startup, Shutdown};
use record_ingest::observability::logging;

#[derive(Parser)]
#[command(name = "record-ingest")]
#[command(about = "In-memory record ingestion and query service", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("record-ingest v{} starting", env!("CARGO_PKG_VERSION"));

    let started = startup::start(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_watcher(shutdown);

    started.server.run(started.listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
