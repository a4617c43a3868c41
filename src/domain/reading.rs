// Vehicle reading domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// JSON numbers cannot carry NaN or infinities, so those are written as
/// the strings "NaN", "inf" and "-inf".
mod channel_value {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid channel value: {:?}", other))),
            },
        }
    }
}

/// One immutable snapshot of every monitored channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    /// °C
    #[serde(with = "channel_value")]
    pub engine_temperature: f64,
    /// %
    #[serde(with = "channel_value")]
    pub battery_level: f64,
    /// km/l
    #[serde(with = "channel_value")]
    pub fuel_efficiency: f64,
    /// PSI
    #[serde(with = "channel_value")]
    pub tire_pressure: f64,
    /// V
    #[serde(with = "channel_value")]
    pub battery_voltage: f64,
    /// %
    #[serde(with = "channel_value")]
    pub fuel_level: f64,
    /// °C
    #[serde(with = "channel_value")]
    pub intake_air_temperature: f64,
    /// %
    #[serde(with = "channel_value")]
    pub engine_load: f64,
    /// V
    #[serde(with = "channel_value")]
    pub oxygen_sensor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub time_ms: i64,
    #[serde(with = "channel_value")]
    pub value: f64,
}

impl DataPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// A battery level observation fed to the life predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryUsage {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "channel_value")]
    pub battery_level: f64,
}

impl BatteryUsage {
    pub fn new(timestamp: DateTime<Utc>, battery_level: f64) -> Self {
        Self {
            timestamp,
            battery_level,
        }
    }
}

/// Channels kept as rolling trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesChannel {
    EngineTemperature,
    BatteryLevel,
    FuelEfficiency,
}

impl SeriesChannel {
    pub const ALL: [SeriesChannel; 3] = [
        SeriesChannel::EngineTemperature,
        SeriesChannel::BatteryLevel,
        SeriesChannel::FuelEfficiency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SeriesChannel::EngineTemperature => "engineTemperature",
            SeriesChannel::BatteryLevel => "batteryLevel",
            SeriesChannel::FuelEfficiency => "fuelEfficiency",
        }
    }

    pub fn value_of(&self, reading: &Reading) -> f64 {
        match self {
            SeriesChannel::EngineTemperature => reading.engine_temperature,
            SeriesChannel::BatteryLevel => reading.battery_level,
            SeriesChannel::FuelEfficiency => reading.fuel_efficiency,
        }
    }
}

impl fmt::Display for SeriesChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeriesChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesChannel::ALL
            .into_iter()
            .find(|channel| channel.name() == s)
            .ok_or_else(|| format!("unknown series channel: {}", s))
    }
}

/// A reading that sits inside every normal band under default thresholds.
#[cfg(test)]
pub(crate) fn nominal_reading(timestamp: DateTime<Utc>) -> Reading {
    Reading {
        timestamp,
        engine_temperature: 90.0,
        battery_level: 80.0,
        fuel_efficiency: 12.0,
        tire_pressure: 32.0,
        battery_voltage: 12.6,
        fuel_level: 50.0,
        intake_air_temperature: 25.0,
        engine_load: 40.0,
        oxygen_sensor: 0.45,
    }
}
