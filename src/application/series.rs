// Rolling in-memory trend series
use crate::domain::bounded::Bounded;
use crate::domain::reading::{BatteryUsage, DataPoint, Reading, SeriesChannel};

pub const SERIES_CAPACITY: usize = 50;
pub const BATTERY_USAGE_CAPACITY: usize = 100;

pub struct RollingSeries {
    engine_temperature: Bounded<DataPoint>,
    battery_level: Bounded<DataPoint>,
    fuel_efficiency: Bounded<DataPoint>,
    battery_usage: Bounded<BatteryUsage>,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingSeries {
    pub fn new() -> Self {
        Self {
            engine_temperature: Bounded::new(SERIES_CAPACITY),
            battery_level: Bounded::new(SERIES_CAPACITY),
            fuel_efficiency: Bounded::new(SERIES_CAPACITY),
            battery_usage: Bounded::new(BATTERY_USAGE_CAPACITY),
        }
    }

    pub fn push(&mut self, reading: &Reading) {
        let time_ms = reading.timestamp.timestamp_millis();
        for channel in SeriesChannel::ALL {
            let point = DataPoint::new(time_ms, channel.value_of(reading));
            self.buffer_mut(channel).push(point);
        }
        self.battery_usage
            .push(BatteryUsage::new(reading.timestamp, reading.battery_level));
    }

    /// Oldest first.
    pub fn series(&self, channel: SeriesChannel) -> Vec<DataPoint> {
        self.buffer(channel).to_vec()
    }

    /// Oldest first.
    pub fn battery_usage(&self) -> Vec<BatteryUsage> {
        self.battery_usage.to_vec()
    }

    fn buffer(&self, channel: SeriesChannel) -> &Bounded<DataPoint> {
        match channel {
            SeriesChannel::EngineTemperature => &self.engine_temperature,
            SeriesChannel::BatteryLevel => &self.battery_level,
            SeriesChannel::FuelEfficiency => &self.fuel_efficiency,
        }
    }

    fn buffer_mut(&mut self, channel: SeriesChannel) -> &mut Bounded<DataPoint> {
        match channel {
            SeriesChannel::EngineTemperature => &mut self.engine_temperature,
            SeriesChannel::BatteryLevel => &mut self.battery_level,
            SeriesChannel::FuelEfficiency => &mut self.fuel_efficiency,
        }
    }
}
