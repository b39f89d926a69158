//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Metrics exporter → Bind listener → Build server
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a listener that cannot bind is fatal; a broken metrics exporter is not
//! - The listener is bound last, so traffic only arrives once the server is ready
//! - The record store is dropped with the process; nothing is flushed

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
