// JSON codec for persisted record collections
use crate::error::StoreError;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    /// Entries that were present but failed to decode.
    pub dropped: usize,
}

pub fn encode_records<'a, T, I>(key: &str, records: I) -> Result<Bytes, StoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let records: Vec<&T> = records.into_iter().collect();
    serde_json::to_vec(&records)
        .map(Bytes::from)
        .map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })
}

/// Decode a JSON array entry by entry. A blob that is not an array at all
/// is an error; individual malformed entries are skipped and counted.
pub fn decode_records<T: DeserializeOwned>(key: &str, blob: &[u8]) -> Result<Decoded<T>, StoreError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_slice(blob).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;

    let mut records = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<T>(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Dropping malformed {} entry at index {}: {}", key, index, e);
                dropped += 1;
            }
        }
    }

    Ok(Decoded { records, dropped })
}
