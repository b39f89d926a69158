//! Process-wide record store.
//!
//! # Responsibilities
//! - Upsert validated records keyed by `id`
//! - Keep an insertion-order index so listings come out newest-first
//! - Answer point, category, search, time-window and aggregate queries
//!
//! # Concurrency
//! One `parking_lot::RwLock` covers the record map and the order index, so
//! every query sees a consistent snapshot and an upsert is never observed
//! half-applied. Lock hold times are bounded by a single pass over the store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use crate::observability::metrics;
use crate::store::clock::{Clock, SystemClock};
use crate::store::error::{StoreError, StoreResult, ValidationError};
use crate::store::record::{NewRecord, Record};
use crate::store::stats::{CategorySlice, Statistics};

#[derive(Debug)]
struct Entry {
    /// Position in the order index.
    seq: u64,
    record: Record,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<i64, Entry>,
    /// seq -> id, ascending seq is oldest first.
    order: BTreeMap<u64, i64>,
    next_seq: u64,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    fn newest_first(&self) -> impl Iterator<Item = &Record> + '_ {
        self.order
            .values()
            .rev()
            .filter_map(|id| self.records.get(id))
            .map(|entry| &entry.record)
    }

    /// Stamps never go backwards, so seq order and `received_at` order agree.
    fn next_stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// In-memory record store shared by all request handlers.
pub struct RecordStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
}

impl RecordStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with a custom time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    /// Validate a producer payload and upsert it.
    pub fn insert(&self, payload: Value) -> StoreResult<Record> {
        let new = NewRecord::from_payload(payload)?;
        Ok(self.upsert(new))
    }

    /// Store a validated record, replacing any record with the same id.
    pub fn upsert(&self, new: NewRecord) -> Record {
        let now = self.clock.now();
        let mut inner = self.inner.write();

        let received_at = inner.next_stamp(now);
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let id = new.id;
        let record = Record::stamp(new, received_at);
        let previous = inner.records.insert(
            id,
            Entry {
                seq,
                record: record.clone(),
            },
        );
        if let Some(old) = &previous {
            inner.order.remove(&old.seq);
        }
        inner.order.insert(seq, id);
        let len = inner.records.len();
        drop(inner);

        let replaced = previous.is_some();
        tracing::debug!(id, replaced, received_at = %received_at, "Record stored");
        metrics::record_ingest(if replaced { "replaced" } else { "inserted" });
        metrics::record_store_size(len);

        record
    }

    /// Every record, newest first.
    pub fn list_all(&self) -> Vec<Record> {
        self.inner.read().newest_first().cloned().collect()
    }

    /// Exact lookup by id.
    pub fn get(&self, id: i64) -> StoreResult<Record> {
        self.inner
            .read()
            .records
            .get(&id)
            .map(|entry| entry.record.clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Records whose `categoria` equals `categoria` exactly, with their `valor` sum.
    pub fn by_category(&self, categoria: &str) -> CategorySlice {
        let records = self.filter_newest_first(|r| r.in_category(categoria));
        CategorySlice::new(records)
    }

    /// Most recently received record of a category.
    pub fn latest_in_category(&self, categoria: &str) -> StoreResult<Record> {
        self.inner
            .read()
            .newest_first()
            .find(|r| r.in_category(categoria))
            .cloned()
            .ok_or_else(|| StoreError::CategoryEmpty(categoria.to_string()))
    }

    /// Case-insensitive substring search on `nome`.
    ///
    /// A blank query is rejected; otherwise `query` is matched as given,
    /// surrounding whitespace included.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Record>> {
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        let needle = query.to_lowercase();
        Ok(self.filter_newest_first(|r| r.nome.to_lowercase().contains(&needle)))
    }

    /// Records received within `window` of now.
    pub fn recent(&self, window: TimeDelta) -> Vec<Record> {
        let cutoff = self.clock.now() - window;
        let inner = self.inner.read();
        // Newest-first walk can stop at the first record older than the cutoff.
        inner
            .newest_first()
            .take_while(|r| r.received_at >= cutoff)
            .cloned()
            .collect()
    }

    /// Records with `start <= received_at <= end`.
    pub fn received_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Record>> {
        if start > end {
            return Err(ValidationError::InvertedPeriod { start, end }.into());
        }
        Ok(self.filter_newest_first(|r| r.received_at >= start && r.received_at <= end))
    }

    /// Store-wide aggregates over a single snapshot.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_records(self.inner.read().newest_first())
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filter_newest_first<F>(&self, keep: F) -> Vec<Record>
    where
        F: Fn(&Record) -> bool,
    {
        self.inner
            .read()
            .newest_first()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("records", &self.len())
            .finish()
    }
}
