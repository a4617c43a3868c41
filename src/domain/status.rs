// Status evaluation - Pure channel checks and tier classification
// A NaN value breaches every bound it is checked against.
use super::reading::Reading;
use super::thresholds::ThresholdConfig;
use super::warning::WarningKind;
use serde::{Deserialize, Serialize};

/// Fixed normal band for battery voltage (V).
pub const BATTERY_VOLTAGE_RANGE: (f64, f64) = (12.0, 13.8);
/// Fixed normal band for the oxygen sensor (V).
pub const OXYGEN_SENSOR_RANGE: (f64, f64) = (0.2, 0.8);
/// Fuel level (%) below which a warning is raised.
pub const FUEL_LEVEL_LOW: f64 = 15.0;

fn above(value: f64, bound: f64) -> bool {
    value.is_nan() || value > bound
}

fn below(value: f64, bound: f64) -> bool {
    value.is_nan() || value < bound
}

fn outside(value: f64, (low, high): (f64, f64)) -> bool {
    below(value, low) || above(value, high)
}

pub fn evaluate_engine_temperature(temperature: f64, config: &ThresholdConfig) -> Option<String> {
    above(temperature, config.engine_temp_high).then(|| {
        format!(
            "Warning: Engine temperature is above {:.0}°C!",
            config.engine_temp_high
        )
    })
}

pub fn evaluate_battery_level(level: f64, config: &ThresholdConfig) -> Option<String> {
    below(level, config.battery_low)
        .then(|| format!("Warning: Battery level is below {:.0}%!", config.battery_low))
}

pub fn evaluate_tire_pressure(pressure: f64, config: &ThresholdConfig) -> Option<String> {
    if below(pressure, config.tire_low) {
        Some(format!(
            "Warning: Tire pressure is below {:.0} PSI!",
            config.tire_low
        ))
    } else if above(pressure, config.tire_high) {
        Some(format!(
            "Warning: Tire pressure is above {:.0} PSI!",
            config.tire_high
        ))
    } else {
        None
    }
}

pub fn evaluate_battery_voltage(voltage: f64) -> Option<String> {
    outside(voltage, BATTERY_VOLTAGE_RANGE).then(|| {
        "Warning: Battery voltage is abnormal (normal range: 12.0 - 13.8 V).".to_string()
    })
}

pub fn evaluate_oxygen_sensor(voltage: f64) -> Option<String> {
    outside(voltage, OXYGEN_SENSOR_RANGE).then(|| {
        "Warning: Oxygen sensor voltage is outside the normal range (0.2 - 0.8 V).".to_string()
    })
}

pub fn evaluate_fuel_level(level: f64) -> Option<String> {
    below(level, FUEL_LEVEL_LOW).then(|| "Warning: Fuel level is below 15%.".to_string())
}

/// One channel outside its band during an evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Breach {
    pub kind: WarningKind,
    pub message: String,
}

/// Runs all six channel checks in a fixed order.
pub fn evaluate(reading: &Reading, config: &ThresholdConfig) -> Vec<Breach> {
    let checks = [
        (
            WarningKind::EngineTemperature,
            evaluate_engine_temperature(reading.engine_temperature, config),
        ),
        (
            WarningKind::BatteryLevel,
            evaluate_battery_level(reading.battery_level, config),
        ),
        (
            WarningKind::TirePressure,
            evaluate_tire_pressure(reading.tire_pressure, config),
        ),
        (
            WarningKind::BatteryVoltage,
            evaluate_battery_voltage(reading.battery_voltage),
        ),
        (
            WarningKind::OxygenSensor,
            evaluate_oxygen_sensor(reading.oxygen_sensor),
        ),
        (
            WarningKind::FuelLevel,
            evaluate_fuel_level(reading.fuel_level),
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(kind, message)| message.map(|message| Breach { kind, message }))
        .collect()
}

/// Severity tier for single-sided channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Normal,
    Moderate,
    High,
}

/// Tier for channels with a band on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandTier {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    Good,
    Moderate,
    Warning,
}

/// Classify a channel that worsens as it rises (engine temperature).
pub fn classify_rising(value: f64, moderate: f64, high: f64) -> Tier {
    if above(value, high) {
        Tier::High
    } else if above(value, moderate) {
        Tier::Moderate
    } else {
        Tier::Normal
    }
}

/// Classify a channel that worsens as it falls (battery level).
pub fn classify_falling(value: f64, low: f64, moderate: f64) -> Tier {
    if below(value, low) {
        Tier::High
    } else if below(value, moderate) {
        Tier::Moderate
    } else {
        Tier::Normal
    }
}

pub fn classify_band(value: f64, low: f64, high: f64) -> BandTier {
    if below(value, low) {
        BandTier::Low
    } else if above(value, high) {
        BandTier::High
    } else {
        BandTier::Normal
    }
}

/// First matching tier wins: Warning, then Moderate, then Good.
pub fn overall_status(reading: &Reading, config: &ThresholdConfig) -> OverallStatus {
    if above(reading.engine_temperature, config.engine_temp_high)
        || below(reading.battery_level, config.battery_low)
        || below(reading.tire_pressure, config.tire_low)
    {
        OverallStatus::Warning
    } else if above(reading.engine_temperature, config.engine_temp_moderate)
        || below(reading.battery_level, config.battery_moderate)
    {
        OverallStatus::Moderate
    } else {
        OverallStatus::Good
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub engine_temperature: Tier,
    pub battery_level: Tier,
    pub tire_pressure: BandTier,
    pub overall: OverallStatus,
}

impl StatusSummary {
    pub fn of(reading: &Reading, config: &ThresholdConfig) -> Self {
        Self {
            engine_temperature: classify_rising(
                reading.engine_temperature,
                config.engine_temp_moderate,
                config.engine_temp_high,
            ),
            battery_level: classify_falling(
                reading.battery_level,
                config.battery_low,
                config.battery_moderate,
            ),
            tire_pressure: classify_band(reading.tire_pressure, config.tire_low, config.tire_high),
            overall: overall_status(reading, config),
        }
    }
}
