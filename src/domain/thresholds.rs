// User-configurable threshold limits
use crate::error::ThresholdError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six user-editable limits, always read and written as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub engine_temp_high: f64,
    pub engine_temp_moderate: f64,
    pub battery_low: f64,
    pub battery_moderate: f64,
    pub tire_low: f64,
    pub tire_high: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            engine_temp_high: 120.0,
            engine_temp_moderate: 100.0,
            battery_low: 20.0,
            battery_moderate: 50.0,
            tire_low: 30.0,
            tire_high: 35.0,
        }
    }
}

impl ThresholdConfig {
    /// Rejects non-finite values and any pair whose lower bound is not
    /// strictly below its upper bound.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for field in ThresholdField::ALL {
            if !field.get(self).is_finite() {
                return Err(ThresholdError::NotFinite { field });
            }
        }

        let pairs = [
            (ThresholdField::EngineTempModerate, ThresholdField::EngineTempHigh),
            (ThresholdField::BatteryLow, ThresholdField::BatteryModerate),
            (ThresholdField::TireLow, ThresholdField::TireHigh),
        ];
        for (lower, upper) in pairs {
            let (lower_value, upper_value) = (lower.get(self), upper.get(self));
            if lower_value >= upper_value {
                return Err(ThresholdError::Ordering {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdField {
    EngineTempHigh,
    EngineTempModerate,
    BatteryLow,
    BatteryModerate,
    TireLow,
    TireHigh,
}

impl ThresholdField {
    pub const ALL: [ThresholdField; 6] = [
        ThresholdField::EngineTempHigh,
        ThresholdField::EngineTempModerate,
        ThresholdField::BatteryLow,
        ThresholdField::BatteryModerate,
        ThresholdField::TireLow,
        ThresholdField::TireHigh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ThresholdField::EngineTempHigh => "engineTempHigh",
            ThresholdField::EngineTempModerate => "engineTempModerate",
            ThresholdField::BatteryLow => "batteryLow",
            ThresholdField::BatteryModerate => "batteryModerate",
            ThresholdField::TireLow => "tireLow",
            ThresholdField::TireHigh => "tireHigh",
        }
    }

    /// Storage key holding this field's value.
    pub fn key(&self) -> &'static str {
        match self {
            ThresholdField::EngineTempHigh => "engineTemperatureThresholdHigh",
            ThresholdField::EngineTempModerate => "engineTemperatureThresholdModerate",
            ThresholdField::BatteryLow => "batteryLevelThresholdLow",
            ThresholdField::BatteryModerate => "batteryLevelThresholdModerate",
            ThresholdField::TireLow => "tirePressureThresholdLow",
            ThresholdField::TireHigh => "tirePressureThresholdHigh",
        }
    }

    pub fn get(&self, config: &ThresholdConfig) -> f64 {
        match self {
            ThresholdField::EngineTempHigh => config.engine_temp_high,
            ThresholdField::EngineTempModerate => config.engine_temp_moderate,
            ThresholdField::BatteryLow => config.battery_low,
            ThresholdField::BatteryModerate => config.battery_moderate,
            ThresholdField::TireLow => config.tire_low,
            ThresholdField::TireHigh => config.tire_high,
        }
    }

    pub fn set(&self, config: &mut ThresholdConfig, value: f64) {
        let slot = match self {
            ThresholdField::EngineTempHigh => &mut config.engine_temp_high,
            ThresholdField::EngineTempModerate => &mut config.engine_temp_moderate,
            ThresholdField::BatteryLow => &mut config.battery_low,
            ThresholdField::BatteryModerate => &mut config.battery_moderate,
            ThresholdField::TireLow => &mut config.tire_low,
            ThresholdField::TireHigh => &mut config.tire_high,
        };
        *slot = value;
    }
}

impl fmt::Display for ThresholdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
