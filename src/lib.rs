//! Runtime-mutable HTTP request router.
//!
//! Requests are matched against a table of path patterns that can be edited
//! through a separate control-plane listener while traffic keeps flowing.

// Core subsystems
pub mod backend;
pub mod config;
pub mod http;
pub mod routing;

// Control plane
pub mod admin;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteError, RouteTable, Router};
