// Warning log - Bounded record of raised warnings plus per-channel tallies
use crate::application::persistence::{Appended, Persistence, WARNING_LOGS_KEY};
use crate::domain::bounded::Bounded;
use crate::domain::reading::Reading;
use crate::domain::status;
use crate::domain::thresholds::ThresholdConfig;
use crate::domain::warning::{MULTIPLE_WARNINGS, Warning, WarningKind};
use crate::error::StoreError;
use crate::infrastructure::record_codec::{decode_records, encode_records};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const WARNING_LOG_CAPACITY: usize = 50;

/// Occurrences of one kind at which a fault counts as repeated.
pub const REPEATED_WARNING_THRESHOLD: u64 = 3;

/// Occurrence count of one warning kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarningTally {
    pub count: u64,
    pub repeated: bool,
}

pub struct WarningLog {
    logs: Bounded<Warning>,
    counts: HashMap<WarningKind, u64>,
    persistence: Arc<dyn Persistence>,
}

impl WarningLog {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            logs: Bounded::new(WARNING_LOG_CAPACITY),
            counts: HashMap::new(),
            persistence,
        }
    }

    /// Evaluate `reading` and, if any channel breached, record one coalesced
    /// warning. The append and the counters stand even if the write-through
    /// fails; the failure is reported in the returned value.
    pub async fn record_if_breached(
        &mut self,
        reading: &Reading,
        config: &ThresholdConfig,
    ) -> Option<Appended<Warning>> {
        let breaches = status::evaluate(reading, config);
        if breaches.is_empty() {
            return None;
        }

        let message = breaches
            .iter()
            .map(|breach| breach.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let warning = Warning::new(MULTIPLE_WARNINGS, message, reading.timestamp);

        self.logs.push(warning.clone());
        for breach in &breaches {
            *self.counts.entry(breach.kind).or_insert(0) += 1;
        }

        let persisted = self.persist().await;
        Some(Appended {
            item: warning,
            persisted,
        })
    }

    pub fn counter_for(&self, kind: WarningKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_repeated(&self, kind: WarningKind) -> bool {
        self.counter_for(kind) >= REPEATED_WARNING_THRESHOLD
    }

    /// Kinds seen so far, each flagged once it reaches the repeat threshold.
    pub fn tallies(&self) -> BTreeMap<WarningKind, WarningTally> {
        self.counts
            .iter()
            .map(|(kind, count)| {
                let tally = WarningTally {
                    count: *count,
                    repeated: self.is_repeated(*kind),
                };
                (*kind, tally)
            })
            .collect()
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<Warning> {
        self.logs.to_vec()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Replace the in-memory log with the contents of a persisted blob.
    /// Returns how many malformed entries were dropped. Counters are left alone.
    pub fn load(&mut self, blob: &[u8]) -> Result<usize, StoreError> {
        let decoded = decode_records::<Warning>(WARNING_LOGS_KEY, blob)?;
        self.logs.replace(decoded.records);
        Ok(decoded.dropped)
    }

    /// Load whatever the persistence backend holds under the log's key.
    pub async fn restore(&mut self) -> Result<usize, StoreError> {
        match self.persistence.load(WARNING_LOGS_KEY).await? {
            Some(blob) => self.load(&blob),
            None => Ok(0),
        }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let blob = encode_records(WARNING_LOGS_KEY, self.logs.iter())?;
        self.persistence.save(WARNING_LOGS_KEY, blob).await
    }
}
