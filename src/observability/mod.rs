//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (route changes, dispatch, upstream errors)
//!     → spans per request carrying the request ID
//!
//! Consumers:
//!     → logging.rs (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`pattern`, `path`, `request_id`) instead of formatted strings
//! - Request ID flows through all subsystems

pub mod logging;

pub use logging::init_logging;
