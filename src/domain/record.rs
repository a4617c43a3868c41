// Persisted diagnostic snapshot
use super::reading::Reading;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub reading: Reading,
}

impl DiagnosticRecord {
    pub fn new(reading: Reading) -> Self {
        Self {
            id: Uuid::new_v4(),
            reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::nominal_reading;
    use chrono::Utc;

    #[test]
    fn test_record_flattens_reading_fields() {
        let record = DiagnosticRecord::new(nominal_reading(Utc::now()));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_some());
        assert_eq!(json["batteryLevel"], 80.0);
        assert!(json.get("reading").is_none());

        let back: DiagnosticRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_missing_field_fails_to_decode() {
        let record = DiagnosticRecord::new(nominal_reading(Utc::now()));
        let mut json = serde_json::to_value(&record).unwrap();
        json.as_object_mut().unwrap().remove("tirePressure");
        assert!(serde_json::from_value::<DiagnosticRecord>(json).is_err());
    }
}
