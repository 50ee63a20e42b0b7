//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared route table and router
//! - Install seed routes from configuration
//! - Bind the data-plane and control-plane listeners
//! - Spawn both servers and hand back a handle for shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Seed routes go in before the listeners bind (traffic only when ready)
//! - After startup, route failures are reported to callers, never fatal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::admin::AdminServer;
use crate::config::{RouteConfig, RouterConfig};
use crate::http::HttpServer;
use crate::lifecycle::{Shutdown, signals};
use crate::routing::{RouteError, RouteTable, Router};

/// Error during startup or shutdown.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("seed route {pattern:?} rejected: {source}")]
    Route {
        pattern: String,
        #[source]
        source: RouteError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Install seed routes through the router.
pub fn seed_routes(router: &Router, routes: &[RouteConfig]) -> Result<(), StartupError> {
    for route in routes {
        router
            .register(&route.pattern, Some(&route.destination))
            .map_err(|source| StartupError::Route {
                pattern: route.pattern.clone(),
                source,
            })?;
    }
    tracing::info!(count = routes.len(), "Seed routes installed");
    Ok(())
}

/// A started router: both servers are running.
pub struct RunningRouter {
    /// Data-plane address actually bound.
    pub data_addr: SocketAddr,
    /// Control-plane address actually bound, if enabled.
    pub admin_addr: Option<SocketAddr>,
    router: Router,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<Result<(), std::io::Error>>>,
}

impl RunningRouter {
    /// The live router, for in-process mutation.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Signal both servers to stop and wait for them to drain.
    pub async fn shutdown(self) -> Result<(), StartupError> {
        self.shutdown.trigger();
        for task in self.tasks {
            task.await??;
        }
        Ok(())
    }
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

/// Build the router, seed it, bind both listeners and spawn the servers.
pub async fn start(config: RouterConfig) -> Result<RunningRouter, StartupError> {
    let table = Arc::new(RouteTable::new());
    let router = Router::new(
        Arc::clone(&table),
        Duration::from_secs(config.timeouts.upstream_secs),
    );
    seed_routes(&router, &config.routes)?;

    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    let data_listener = bind(&config.listener.bind_address).await?;
    let data_addr = data_listener.local_addr()?;

    let admin_addr = if config.admin.enabled {
        let admin_listener = bind(&config.admin.bind_address).await?;
        let admin_addr = admin_listener.local_addr()?;
        let admin = AdminServer::new(router.clone(), &config.admin, &config.timeouts);
        tasks.push(tokio::spawn(admin.run(admin_listener, shutdown.subscribe())));
        Some(admin_addr)
    } else {
        tracing::info!("Admin server disabled");
        None
    };

    let server = HttpServer::new(table, &config.timeouts);
    tasks.push(tokio::spawn(server.run(data_listener, shutdown.subscribe())));

    Ok(RunningRouter {
        data_addr,
        admin_addr,
        router,
        shutdown,
        tasks,
    })
}

/// Start the router and serve until SIGINT/SIGTERM.
pub async fn run(config: RouterConfig) -> Result<(), StartupError> {
    let running = start(config).await?;
    tracing::info!(
        data = %running.data_addr,
        admin = ?running.admin_addr,
        "Router ready"
    );

    signals::wait_for_signal().await;
    tracing::info!("Shutdown signal received");
    running.shutdown().await
}
