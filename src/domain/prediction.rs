// Battery life projection from recent usage
use super::reading::BatteryUsage;
use serde::Serialize;
use std::fmt;

/// Number of most recent samples the rate is computed over.
pub const PREDICTION_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BatteryPrediction {
    InsufficientData,
    InvalidInterval,
    StableOrIncreasing,
    Estimate { hours: f64 },
}

impl fmt::Display for BatteryPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryPrediction::InsufficientData => f.write_str("Not enough data for prediction"),
            BatteryPrediction::InvalidInterval => f.write_str("Invalid time interval"),
            BatteryPrediction::StableOrIncreasing => {
                f.write_str("Battery level is stable or increasing")
            }
            BatteryPrediction::Estimate { hours } => {
                write!(f, "Estimated battery life: {:.1} hours", hours)
            }
        }
    }
}

/// Linear projection over the last `PREDICTION_WINDOW` samples, oldest first.
///
/// No smoothing or outlier rejection: the rate is simply the level drop
/// between the first and last sample of the window divided by the hours
/// between them.
pub fn predict_battery_life(history: &[BatteryUsage], current_level: f64) -> BatteryPrediction {
    if history.len() < 2 {
        return BatteryPrediction::InsufficientData;
    }

    let window = &history[history.len().saturating_sub(PREDICTION_WINDOW)..];
    let (start, end) = match (window.first(), window.last()) {
        (Some(start), Some(end)) => (start, end),
        _ => return BatteryPrediction::InsufficientData,
    };

    let hours = (end.timestamp - start.timestamp).num_milliseconds() as f64 / 3_600_000.0;
    if hours <= 0.0 {
        return BatteryPrediction::InvalidInterval;
    }

    let decrease_per_hour = (start.battery_level - end.battery_level) / hours;
    // Written so a NaN rate also lands here.
    if !(decrease_per_hour > 0.0) {
        return BatteryPrediction::StableOrIncreasing;
    }

    BatteryPrediction::Estimate {
        hours: current_level / decrease_per_hour,
    }
}
