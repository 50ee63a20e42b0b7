//! Control plane.
//!
//! # Endpoints
//! - `GET    /admin/status`            version and route count
//! - `GET    /admin/routes`            current table, including implicit redirects
//! - `POST   /admin/routes`            `{"pattern": "/foo/", "destination": "http://:8081/"}`
//! - `DELETE /admin/routes?pattern=..` remove a route
//!
//! Runs on its own listener. Rejected mutations come back as 4xx responses;
//! handler panics become 500s and never reach the data plane.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router as AxumRouter, middleware, routing::get};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::{AdminConfig, TimeoutConfig};
use crate::routing::Router;

/// State shared by the control-plane handlers.
#[derive(Clone)]
pub struct AdminState {
    pub router: Router,
    pub api_key: Option<Arc<str>>,
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState, max_body_size: usize, request_timeout: Duration) -> AxumRouter {
    AxumRouter::new()
        .route("/admin/status", get(get_status))
        .route(
            "/admin/routes",
            get(list_routes).post(register_route).delete(deregister_route),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Control-plane HTTP server.
pub struct AdminServer {
    router: AxumRouter,
}

impl AdminServer {
    pub fn new(router: Router, config: &AdminConfig, timeouts: &TimeoutConfig) -> Self {
        let state = AdminState {
            router,
            api_key: config.api_key.as_deref().map(Arc::from),
        };
        Self {
            router: setup_admin_router(
                state,
                config.max_body_size,
                Duration::from_secs(timeouts.request_secs),
            ),
        }
    }

    /// Serve the control plane until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %listener.local_addr()?, "Admin server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Admin server stopped");
        Ok(())
    }
}
