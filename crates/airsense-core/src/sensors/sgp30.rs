use super::{ECO2, SensorReadings, SensorValues, TVOC};

/// Typed readings from the SGP30 air quality sensor.
///
/// The SGP30 reports integers already, so no scaling is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sgp30Readings {
    pub tvoc_ppb: i32,
    pub eco2_ppm: i32,
}

impl Sgp30Readings {
    pub(crate) const fn from_values(values: &SensorValues) -> Self {
        Self {
            tvoc_ppb: values.get(TVOC),
            eco2_ppm: values.get(ECO2),
        }
    }
}

impl SensorReadings<2> for Sgp30Readings {
    fn to_array(self) -> [i32; 2] {
        [self.tvoc_ppb, self.eco2_ppm]
    }
}
