//! Record sink: where completed game records are persisted.
//!
//! The engine never retries. A failed `upsert` leaves the engine's state as
//! it was, so the caller can retry the same record as often as it likes.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use super::record::{GameRecord, HistoryError};

/// Errors surfaced by a record sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("record sink unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Encode(#[from] HistoryError),
}

/// Storage for completed game records.
///
/// `upsert` is keyed by `GameRecord::id`: writing the same id again replaces
/// the stored record.
pub trait RecordSink {
    /// Insert or overwrite a record.
    fn upsert(&mut self, record: &GameRecord) -> Result<(), SinkError>;
}

/// In-memory sink that stores the binary encoding of each record.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: BTreeMap<String, Vec<u8>>,
    failures_left: u32,
    writes: u32,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` writes fail with `SinkError::Unavailable`.
    pub fn fail_next(&mut self, count: u32) {
        self.failures_left = count;
    }

    /// Decode a stored record.
    pub fn get(&self, id: &str) -> Option<Result<GameRecord, HistoryError>> {
        self.records.get(id).map(|bytes| GameRecord::from_bytes(bytes))
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the sink is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Successful writes so far.
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl RecordSink for MemorySink {
    fn upsert(&mut self, record: &GameRecord) -> Result<(), SinkError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            warn!(record = %record.id, "record sink write failed");
            return Err(SinkError::Unavailable("injected failure".to_string()));
        }
        let bytes = record.to_bytes()?;
        let replaced = self.records.insert(record.id.clone(), bytes).is_some();
        self.writes += 1;
        debug!(record = %record.id, replaced, "record stored");
        Ok(())
    }
}
