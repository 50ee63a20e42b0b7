//! Prefix-route composition over the route table.
//!
//! # Responsibilities
//! - Add/remove exact routes (`/bar`) as single table entries
//! - Add/remove prefix routes (`/foo/`) as a subtree entry plus an explicit
//!   entry at the bare path, so `/foo` is served without a redirect hop
//! - Turn destination URLs into proxy backends
//!
//! # Design Decisions
//! - Holds the table by `Arc` and delegates; no table logic lives here
//! - Both halves of a prefix route change in one write critical section
//! - Table errors are returned unchanged

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendHandler, ProxyBackend, ProxyClient, parse_destination, proxy};
use crate::routing::error::RouteError;
use crate::routing::path::{split_host, subtree_root, validate_pattern};
use crate::routing::table::RouteTable;

/// Runtime-mutable router.
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    client: ProxyClient,
    upstream_timeout: Duration,
}

impl Router {
    /// Create a router over `table` with its own forwarding client.
    pub fn new(table: Arc<RouteTable>, upstream_timeout: Duration) -> Self {
        Self::with_client(table, proxy::new_client(), upstream_timeout)
    }

    pub fn with_client(table: Arc<RouteTable>, client: ProxyClient, upstream_timeout: Duration) -> Self {
        Self {
            table,
            client,
            upstream_timeout,
        }
    }

    /// The underlying table, for the data plane.
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Add a route.
    ///
    /// `/bar` is an exact route. `/foo/` serves `/foo`, `/foo/` and everything
    /// below it from `backend`. Either the whole route is installed or nothing is.
    pub fn add_route(&self, pattern: &str, backend: BackendHandler) -> Result<(), RouteError> {
        match subtree_root(pattern) {
            Some(bare) => self.table.transaction(|map| {
                map.handle(pattern, backend.clone())?;
                map.handle(bare, backend)
            }),
            None => self.table.handle(pattern, backend),
        }
    }

    /// Remove a route added with [`Router::add_route`].
    pub fn remove_route(&self, pattern: &str) -> Result<(), RouteError> {
        match subtree_root(pattern) {
            Some(bare) => self.table.transaction(|map| {
                map.remove_handler(pattern)?;
                map.remove_handler(bare).map(|_| ())
            }),
            None => self.table.remove_handler(pattern),
        }
    }

    /// Add a route forwarding to `destination`.
    ///
    /// The host qualifier of `pattern`, if any, is lower-cased first.
    pub fn register(&self, pattern: &str, destination: Option<&str>) -> Result<(), RouteError> {
        validate_pattern(pattern)?;
        let (host, path) = split_host(pattern);
        let pattern = &format!("{}{}", host.to_ascii_lowercase(), path);

        let destination = destination
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| RouteError::NilBackend(pattern.to_string()))?;

        let url = parse_destination(destination)?;
        let backend = ProxyBackend::new(url, self.client.clone(), self.upstream_timeout)?;
        self.add_route(pattern, Arc::new(backend))?;

        tracing::info!(pattern = %pattern, destination = %destination, "Route registered");
        Ok(())
    }

    /// Remove a route by pattern.
    pub fn deregister(&self, pattern: &str) -> Result<(), RouteError> {
        let (host, path) = split_host(pattern);
        let pattern = &format!("{}{}", host.to_ascii_lowercase(), path);
        self.remove_route(pattern)?;
        tracing::info!(pattern = %pattern, "Route removed");
        Ok(())
    }
}
