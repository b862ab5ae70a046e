use super::{PRESSURE, PRESSURE_TEMPERATURE, SensorReadings, SensorValues, round_to_i32};

/// Typed readings from the QMP6988 barometric pressure sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qmp6988Readings {
    pub pressure_pa: i32,
    /// Die temperature of the pressure sensor, not the ambient reading
    pub temperature_milli_celsius: i32,
}

impl Qmp6988Readings {
    pub fn from_measurement(pressure_pa: f32, temperature_celsius: f32) -> Self {
        Self {
            pressure_pa: round_to_i32(pressure_pa),
            temperature_milli_celsius: round_to_i32(temperature_celsius * 1000.0),
        }
    }

    pub(crate) const fn from_values(values: &SensorValues) -> Self {
        Self {
            pressure_pa: values.get(PRESSURE),
            temperature_milli_celsius: values.get(PRESSURE_TEMPERATURE),
        }
    }

    pub fn pressure_hpa(&self) -> f32 {
        self.pressure_pa as f32 / 100.0
    }

    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_milli_celsius as f32 / 1000.0
    }
}

impl SensorReadings<2> for Qmp6988Readings {
    fn to_array(self) -> [i32; 2] {
        [self.pressure_pa, self.temperature_milli_celsius]
    }
}
