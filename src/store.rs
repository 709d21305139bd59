//! In-memory, append-only record store with paginated retrieval.
//!
//! The store is the only mutable shared resource in the pipeline. It is
//! constructed and owned by the caller and injected into
//! [`crate::pipeline::Ingestor`], never a process-wide singleton, which
//! keeps tests hermetic and allows independent stores in one process.

use std::sync::RwLock;

use thiserror::Error;

use crate::types::Record;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A previous panic poisoned the store lock.
    #[error("record store lock poisoned")]
    Poisoned,
}

/// Concurrency-safe, append-only collection of accepted records.
///
/// Reads (`list`, `count`, `records_for_upload`) may run in parallel with each
/// other; `append` and `clear` take the lock exclusively, so a reader observes
/// either all or none of a given append.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<Record>>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all given records, in the order given, in one exclusive
    /// critical section.
    pub fn append(&self, records: Vec<Record>) -> Result<(), StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;
        guard.extend(records);
        Ok(())
    }

    /// Return up to `limit` records starting at `offset` in insertion order,
    /// together with the total store size at the time of the read.
    ///
    /// An `offset` at or past the end yields an empty page with the true
    /// total. Clamping `limit` (the external layer caps it at 1000) is the
    /// caller's responsibility.
    pub fn list(&self, limit: usize, offset: usize) -> Result<(Vec<Record>, usize), StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let total = guard.len();

        if offset >= total {
            return Ok((Vec::new(), total));
        }

        let end = (offset + limit).min(total);
        Ok((guard[offset..end].to_vec(), total))
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<usize, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.len())
    }

    /// All records belonging to one upload, in insertion order.
    pub fn records_for_upload(&self, upload_id: &str) -> Result<Vec<Record>, StoreError> {
        let guard = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.upload_id == upload_id)
            .cloned()
            .collect())
    }

    /// Remove all records. Intended for test isolation, not steady-state use.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.records.write().map_err(|_| StoreError::Poisoned)?;
        guard.clear();
        Ok(())
    }
}
