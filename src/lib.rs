//! In-memory record ingestion and query service.
//!
//! Producers POST records to `/api/receive`; consumers list them, look them
//! up by id or category, search by name and read aggregate statistics.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::RecordStore;
