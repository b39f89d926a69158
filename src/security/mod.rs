//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (reject oversized bodies)
//!     → handlers
//! Outgoing response:
//!     → headers.rs (nosniff, no-store)
//! ```
//!
//! # Design Decisions
//! - No trust in client input: payloads are validated field by field in the store
//! - Authentication and CORS are left to whatever fronts the service

pub mod headers;
pub mod limits;
