//! Data-plane HTTP server.
//!
//! # Responsibilities
//! - Create the Axum Router that hands every request to the route table
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown broadcast fires
//!
//! # Design Decisions
//! - A single fallback handler: all matching lives in the route table
//! - Each connection runs on its own Tokio task
//! - The table is shared by `Arc` with the control plane

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    response::Response,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TimeoutConfig;
use crate::http::request::{MakeRequestUuidV4, RequestIdExt};
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
}

/// Data-plane server.
pub struct HttpServer {
    router: Router,
    table: Arc<RouteTable>,
}

impl HttpServer {
    /// Create a server dispatching through `table`.
    pub fn new(table: Arc<RouteTable>, timeouts: &TimeoutConfig) -> Self {
        let state = AppState {
            table: Arc::clone(&table),
        };
        let router = Self::build_router(timeouts, state);
        Self { router, table }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(timeouts: &TimeoutConfig, state: AppState) -> Router {
        Router::new()
            .fallback(route_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.table.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the route table.
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }
}

/// Hand the request to the route table.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.table.serve(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::StaticBackend;
    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let table = Arc::new(RouteTable::new());
        table.handle("/", StaticBackend::handler("root")).unwrap();
        table.handle("/docs/", StaticBackend::handler("docs")).unwrap();
        HttpServer::new(table, &TimeoutConfig::default())
    }

    #[tokio::test]
    async fn routes_through_table() {
        let server = server();
        assert_eq!(server.table().len(), 3);
        let response = server
            .router
            .oneshot(Request::builder().uri("/docs/intro").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn keeps_client_request_id() {
        let response = server()
            .router
            .oneshot(
                Request::builder()
                    .uri("/anything")
                    .header("x-request-id", "client-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "client-1");
    }

    #[tokio::test]
    async fn implicit_redirect_is_served() {
        let response = server()
            .router
            .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/docs/");
    }
}
