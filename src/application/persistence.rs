// Persistence trait for the key-value storage substrate
use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;

pub const WARNING_LOGS_KEY: &str = "WarningLogs";
pub const DIAGNOSTIC_HISTORY_KEY: &str = "DiagnosticHistory";

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Store a blob under `key`, replacing any previous value
    async fn save(&self, key: &str, blob: Bytes) -> Result<(), StoreError>;

    /// Load the blob stored under `key`, or `None` if nothing was saved
    async fn load(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
}

/// Outcome of an append whose in-memory effect stands even when the
/// write-through failed.
#[derive(Debug)]
pub struct Appended<T> {
    pub item: T,
    pub persisted: Result<(), StoreError>,
}
