// Error types shared across layers
use crate::domain::thresholds::ThresholdField;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("{field} must be a finite number")]
    NotFinite { field: ThresholdField },

    #[error("{lower} ({lower_value}) must be below {upper} ({upper_value})")]
    Ordering {
        lower: ThresholdField,
        lower_value: f64,
        upper: ThresholdField,
        upper_value: f64,
    },

    /// The new value is in effect but could not be written out.
    #[error("Threshold persisted badly: {0}")]
    Store(#[from] StoreError),
}
