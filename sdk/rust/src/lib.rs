//! Typed client for the record-ingest HTTP API.

pub mod client;

pub use client::{
    CategoryListing, ClientError, HealthStatus, IngestClient, Record, RecordList, Statistics,
};
