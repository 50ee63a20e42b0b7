//! Runtime-mutable HTTP router.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  MUTABLE ROUTER                  │
//!   Client Request    │  ┌─────────┐   ┌────────────┐   ┌────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│ RouteTable │──▶│  backend   │───┼──▶ Backend
//!                     │  │ server  │   │ (RwLock)   │   │  proxy     │   │    Server
//!                     │  └─────────┘   └─────▲──────┘   └────────────┘   │
//!                     │                      │ handle / remove_handler   │
//!                     │                ┌─────┴──────┐                    │
//!   Admin Request     │  ┌─────────┐   │   Router   │                    │
//!   ──────────────────┼─▶│  admin  │──▶│ (prefix    │                    │
//!                     │  │ server  │   │  routes)   │                    │
//!                     │  └─────────┘   └────────────┘                    │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mutable_router::config::{ConfigError, RouterConfig, load_config, validation::validate_config};
use mutable_router::lifecycle;
use mutable_router::observability::init_logging;

#[derive(Parser)]
#[command(name = "mutable-router")]
#[command(about = "HTTP router whose routes can be changed while it serves traffic", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data-plane bind address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Control-plane bind address (overrides config).
    #[arg(long)]
    admin_listen: Option<String>,

    /// Log level or filter directive (overrides config; RUST_LOG wins over both).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(admin_listen) = cli.admin_listen {
        config.admin.bind_address = admin_listen;
    }
    if let Some(log_level) = cli.log_level {
        config.observability.log_level = log_level;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        admin_address = %config.admin.bind_address,
        seed_routes = config.routes.len(),
        "mutable-router starting"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
