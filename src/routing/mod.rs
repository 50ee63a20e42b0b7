//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Data plane:
//!     Request (method, host, path)
//!     → path.rs   (canonicalize, 301 if different)
//!     → table.rs  (read lock, longest pattern, host-qualified first)
//!     → BackendHandler or not-found
//!
//! Control plane:
//!     register / deregister
//!     → router.rs (prefix-route composition)
//!     → table.rs  (write lock, implicit redirect bookkeeping)
//! ```
//!
//! # Design Decisions
//! - Routes are mutable at runtime; the data plane never stops serving
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same table and input always match the same route
//! - Mutation failures are typed errors, never panics

pub mod error;
pub mod path;
pub mod router;
pub mod table;

pub use error::RouteError;
pub use path::canonicalize;
pub use router::Router;
pub use table::{RouteEntry, RouteInfo, RouteMap, RouteTable};
