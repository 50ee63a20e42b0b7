//! Backend handlers.
//!
//! # Data Flow
//! ```text
//! RouteTable::dispatch
//!     → BackendHandler (Arc<dyn Backend>)
//!         → proxy.rs     (forward to destination URL)
//!         → RedirectBackend (implicit subtree redirect)
//!         → NotFoundBackend (no route matched)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Backends are shared trait objects; the route table only clones the `Arc`
//! - Futures are `'static` so the table lock is released before awaiting

pub mod proxy;

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::future::{self, BoxFuture, FutureExt};

pub use proxy::{ProxyBackend, ProxyClient, parse_destination};

/// A downstream target that produces the response for a matched request.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Handle the request.
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response>;

    /// Short human-readable description for route listings.
    fn describe(&self) -> String;
}

/// Shared handle to a backend, as stored in the route table.
pub type BackendHandler = Arc<dyn Backend>;

/// Issues a permanent redirect to a fixed location.
#[derive(Debug, Clone)]
pub struct RedirectBackend {
    location: String,
    status: StatusCode,
}

impl RedirectBackend {
    /// 301 redirect to `location`.
    pub fn permanent(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Backend for RedirectBackend {
    fn call(&self, _request: Request<Body>) -> BoxFuture<'static, Response> {
        future::ready(redirect(self.status, &self.location)).boxed()
    }

    fn describe(&self) -> String {
        format!("redirect {} {}", self.status.as_u16(), self.location)
    }
}

/// Fallback used when no pattern matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundBackend;

impl Backend for NotFoundBackend {
    fn call(&self, _request: Request<Body>) -> BoxFuture<'static, Response> {
        future::ready((StatusCode::NOT_FOUND, "No matching route found").into_response()).boxed()
    }

    fn describe(&self) -> String {
        "not found".to_string()
    }
}

/// Build a redirect response. Falls back to 500 if `location` is not a valid header value.
pub(crate) fn redirect(status: StatusCode, location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect location is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Replies 200 with its own name as the body.
    #[derive(Debug)]
    pub struct StaticBackend(pub &'static str);

    impl StaticBackend {
        pub fn handler(name: &'static str) -> BackendHandler {
            Arc::new(StaticBackend(name))
        }
    }

    impl Backend for StaticBackend {
        fn call(&self, _request: Request<Body>) -> BoxFuture<'static, Response> {
            future::ready((StatusCode::OK, self.0).into_response()).boxed()
        }

        fn describe(&self) -> String {
            format!("static {}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn redirect_backend_sets_location() {
        let backend = RedirectBackend::permanent("/foo/");
        let response = backend.call(Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/foo/");
        assert_eq!(backend.describe(), "redirect 301 /foo/");
        assert_eq!(backend.location(), "/foo/");
    }

    #[tokio::test]
    async fn not_found_backend() {
        let response = NotFoundBackend.call(Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
