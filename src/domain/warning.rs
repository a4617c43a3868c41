// Warning domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Type recorded on every coalesced warning.
pub const MULTIPLE_WARNINGS: &str = "Multiple Warnings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Per-channel warning category, tallied for repeated-fault detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningKind {
    #[serde(rename = "Engine Temperature")]
    EngineTemperature,
    #[serde(rename = "Battery Level")]
    BatteryLevel,
    #[serde(rename = "Tire Pressure")]
    TirePressure,
    #[serde(rename = "Battery Voltage")]
    BatteryVoltage,
    #[serde(rename = "Oxygen Sensor")]
    OxygenSensor,
    #[serde(rename = "Fuel Level")]
    FuelLevel,
}

impl WarningKind {
    pub const ALL: [WarningKind; 6] = [
        WarningKind::EngineTemperature,
        WarningKind::BatteryLevel,
        WarningKind::TirePressure,
        WarningKind::BatteryVoltage,
        WarningKind::OxygenSensor,
        WarningKind::FuelLevel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::EngineTemperature => "Engine Temperature",
            WarningKind::BatteryLevel => "Battery Level",
            WarningKind::TirePressure => "Tire Pressure",
            WarningKind::BatteryVoltage => "Battery Voltage",
            WarningKind::OxygenSensor => "Oxygen Sensor",
            WarningKind::FuelLevel => "Fuel Level",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
