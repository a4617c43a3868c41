// Diagnostic history - Bounded, persisted ring of full reading snapshots
use crate::application::persistence::{Appended, DIAGNOSTIC_HISTORY_KEY, Persistence};
use crate::domain::bounded::Bounded;
use crate::domain::reading::Reading;
use crate::domain::record::DiagnosticRecord;
use crate::error::StoreError;
use crate::infrastructure::record_codec::{decode_records, encode_records};
use std::sync::Arc;

pub const HISTORY_CAPACITY: usize = 10;

pub struct DiagnosticHistoryStore {
    records: Bounded<DiagnosticRecord>,
    persistence: Arc<dyn Persistence>,
}

impl DiagnosticHistoryStore {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            records: Bounded::new(HISTORY_CAPACITY),
            persistence,
        }
    }

    /// Record a snapshot of `reading` and write the whole store through
    /// before returning.
    pub async fn append(&mut self, reading: &Reading) -> Appended<DiagnosticRecord> {
        let record = DiagnosticRecord::new(reading.clone());
        self.records.push(record.clone());
        let persisted = self.persist().await;
        Appended {
            item: record,
            persisted,
        }
    }

    /// Oldest first.
    pub fn all(&self) -> Vec<DiagnosticRecord> {
        self.records.to_vec()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the in-memory store from a persisted blob. Records missing a
    /// required field are dropped one by one; the count is returned.
    pub fn load(&mut self, blob: &[u8]) -> Result<usize, StoreError> {
        let decoded = decode_records::<DiagnosticRecord>(DIAGNOSTIC_HISTORY_KEY, blob)?;
        self.records.replace(decoded.records);
        Ok(decoded.dropped)
    }

    pub async fn restore(&mut self) -> Result<usize, StoreError> {
        match self.persistence.load(DIAGNOSTIC_HISTORY_KEY).await? {
            Some(blob) => self.load(&blob),
            None => Ok(0),
        }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let blob = encode_records(DIAGNOSTIC_HISTORY_KEY, self.records.iter())?;
        self.persistence.save(DIAGNOSTIC_HISTORY_KEY, blob).await
    }
}
