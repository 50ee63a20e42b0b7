//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Route table → Seed routes → Bind listeners → Spawn servers
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Both servers drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then table, then listeners
//! - One broadcast stops the data plane and the control plane together

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{RunningRouter, StartupError, run, start};
