use super::{HUMIDITY, SensorReadings, SensorValues, TEMPERATURE, round_to_i32};

/// Typed readings from the SHT30 temperature / humidity sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sht30Readings {
    pub temperature_milli_celsius: i32,
    pub humidity_milli_percent: i32,
}

impl Sht30Readings {
    /// Build from the floating-point values the vendor driver reports.
    pub fn from_measurement(temperature_celsius: f32, humidity_percent: f32) -> Self {
        Self {
            temperature_milli_celsius: round_to_i32(temperature_celsius * 1000.0),
            humidity_milli_percent: round_to_i32(humidity_percent * 1000.0),
        }
    }

    pub(crate) const fn from_values(values: &SensorValues) -> Self {
        Self {
            temperature_milli_celsius: values.get(TEMPERATURE),
            humidity_milli_percent: values.get(HUMIDITY),
        }
    }

    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_milli_celsius as f32 / 1000.0
    }

    pub fn humidity_percent(&self) -> f32 {
        self.humidity_milli_percent as f32 / 1000.0
    }
}

impl SensorReadings<2> for Sht30Readings {
    fn to_array(self) -> [i32; 2] {
        [self.temperature_milli_celsius, self.humidity_milli_percent]
    }
}
