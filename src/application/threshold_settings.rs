// Threshold settings - Persisted, validated, observable threshold config
use crate::application::persistence::Persistence;
use crate::domain::thresholds::{ThresholdConfig, ThresholdField};
use crate::error::{StoreError, ThresholdError};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

pub struct ThresholdSettings {
    current: watch::Sender<ThresholdConfig>,
    write_lock: Mutex<()>,
    persistence: Arc<dyn Persistence>,
}

impl ThresholdSettings {
    pub fn new(config: ThresholdConfig, persistence: Arc<dyn Persistence>) -> Self {
        let (current, _) = watch::channel(config);
        Self {
            current,
            write_lock: Mutex::new(()),
            persistence,
        }
    }

    /// Read each field from its own key. Missing or unreadable keys fall back
    /// to that field's default; an inconsistent result falls back entirely.
    pub async fn load(persistence: Arc<dyn Persistence>) -> Self {
        let mut config = ThresholdConfig::default();

        for field in ThresholdField::ALL {
            match persistence.load(field.key()).await {
                Ok(Some(blob)) => match serde_json::from_slice::<f64>(&blob) {
                    Ok(value) => field.set(&mut config, value),
                    Err(e) => tracing::warn!("Ignoring stored {}: {}", field.key(), e),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to load {}: {}", field.key(), e),
            }
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Stored thresholds are inconsistent ({}), using defaults", e);
            config = ThresholdConfig::default();
        }

        tracing::debug!("Loaded thresholds: {:?}", config);
        Self::new(config, persistence)
    }

    /// One consistent copy of all six values.
    pub fn snapshot(&self) -> ThresholdConfig {
        *self.current.borrow()
    }

    /// Validate and publish a single field edit, then persist that field.
    ///
    /// A rejected edit changes nothing. A persistence failure is returned as
    /// `ThresholdError::Store` but the new value stays in effect.
    pub async fn set(&self, field: ThresholdField, value: f64) -> Result<ThresholdConfig, ThresholdError> {
        let _guard = self.write_lock.lock().await;

        let mut candidate = self.snapshot();
        field.set(&mut candidate, value);
        candidate.validate()?;
        self.current.send_replace(candidate);

        let blob = serde_json::to_vec(&value).map_err(|source| StoreError::Encode {
            key: field.key().to_string(),
            source,
        })?;
        self.persistence.save(field.key(), Bytes::from(blob)).await?;

        tracing::info!("Threshold {} set to {}", field, value);
        Ok(candidate)
    }
}
