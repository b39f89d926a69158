//! In-memory record store.
//!
//! # Data Flow
//! ```text
//! POST payload (serde_json::Value)
//!     → record.rs (validate id / nome / valor / categoria)
//!     → memory.rs (upsert under write lock, stamp received_at)
//!     → Record (echoed back to the producer)
//!
//! Queries:
//!     memory.rs (read lock, newest-first walk of the order index)
//!     → filters: id, categoria, nome substring, time window
//!     → stats.rs (aggregates over the same snapshot)
//! ```
//!
//! # Design Decisions
//! - A single reader-writer lock guards the whole store
//! - Re-receiving an id replaces the record and makes it the newest
//! - Timestamps come from a `Clock` so tests can control time
//! - The store lives as long as the process; nothing is persisted

pub mod clock;
pub mod error;
pub mod memory;
pub mod record;
pub mod stats;

pub use clock::{Clock, SystemClock};
pub use error::{StoreError, StoreResult, ValidationError};
pub use memory::RecordStore;
pub use record::{NewRecord, Record, MAX_VALOR, UNCATEGORIZED};
pub use stats::{CategorySlice, Statistics};
