// Reading sources - The pluggable feed and its synthetic default
use crate::domain::reading::Reading;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Produces the next reading on each tick.
pub trait ReadingSource: Send {
    fn next_reading(&mut self) -> Reading;
}

impl<F> ReadingSource for F
where
    F: FnMut() -> Reading + Send,
{
    fn next_reading(&mut self) -> Reading {
        self()
    }
}

pub const ENGINE_TEMPERATURE: RangeInclusive<f64> = 60.0..=120.0;
pub const BATTERY_LEVEL: RangeInclusive<f64> = 10.0..=100.0;
pub const FUEL_EFFICIENCY: RangeInclusive<f64> = 5.0..=20.0;
pub const TIRE_PRESSURE: RangeInclusive<f64> = 28.0..=35.0;
pub const BATTERY_VOLTAGE: RangeInclusive<f64> = 12.0..=13.8;
pub const FUEL_LEVEL: RangeInclusive<f64> = 10.0..=100.0;
pub const INTAKE_AIR_TEMPERATURE: RangeInclusive<f64> = 20.0..=40.0;
pub const ENGINE_LOAD: RangeInclusive<f64> = 20.0..=80.0;
pub const OXYGEN_SENSOR: RangeInclusive<f64> = 0.1..=0.9;

/// Uniform-random values per channel, independent from tick to tick.
pub struct SensorSimulator {
    rng: StdRng,
}

impl SensorSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn sample(&mut self, range: RangeInclusive<f64>) -> f64 {
        self.rng.gen_range(range)
    }
}

impl ReadingSource for SensorSimulator {
    fn next_reading(&mut self) -> Reading {
        Reading {
            timestamp: Utc::now(),
            engine_temperature: self.sample(ENGINE_TEMPERATURE),
            battery_level: self.sample(BATTERY_LEVEL),
            fuel_efficiency: self.sample(FUEL_EFFICIENCY),
            tire_pressure: self.sample(TIRE_PRESSURE),
            battery_voltage: self.sample(BATTERY_VOLTAGE),
            fuel_level: self.sample(FUEL_LEVEL),
            intake_air_temperature: self.sample(INTAKE_AIR_TEMPERATURE),
            engine_load: self.sample(ENGINE_LOAD),
            oxygen_sensor: self.sample(OXYGEN_SENSOR),
        }
    }
}
