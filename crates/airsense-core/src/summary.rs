//! One-line human readable summaries of the latest readings
//!
//! These are owned, fixed-capacity strings so they can be handed to the
//! display or a log line without borrowing sensor state.

use core::fmt::Write;

use heapless::String;

use crate::sensors::{
    GasReadings, Qmp6988Readings, SensorKind, SensorValues, Sgp30Readings, Sht30Readings,
};

/// Longest summary line, in bytes
pub const SUMMARY_CAPACITY: usize = 48;

pub type Summary = String<SUMMARY_CAPACITY>;

// Every format below fits SUMMARY_CAPACITY for in-range values. A value that
// does not fit leaves the line truncated rather than failing the caller.
fn render(args: core::fmt::Arguments<'_>) -> Summary {
    let mut line = Summary::new();
    if line.write_fmt(args).is_err() {
        log::warn!("summary line truncated at {} bytes", SUMMARY_CAPACITY);
    }
    line
}

pub fn sht30_summary(readings: &Sht30Readings) -> Summary {
    render(format_args!(
        "T: {:.2} C  H: {:.2} %",
        readings.temperature_celsius(),
        readings.humidity_percent()
    ))
}

pub fn qmp6988_summary(readings: &Qmp6988Readings) -> Summary {
    render(format_args!(
        "P: {:.2} hPa  T: {:.2} C",
        readings.pressure_hpa(),
        readings.temperature_celsius()
    ))
}

pub fn sgp30_summary(readings: &Sgp30Readings) -> Summary {
    render(format_args!(
        "TVOC: {} ppb  eCO2: {} ppm",
        readings.tvoc_ppb, readings.eco2_ppm
    ))
}

/// Gas sensor line from a raw Rs / R0 ratio.
pub fn mq9_summary(ratio: f32) -> Summary {
    if ratio.is_finite() {
        render(format_args!("Rs/R0: {:.3}", ratio))
    } else {
        render(format_args!("Rs/R0: --"))
    }
}

/// Gas sensor line including the concentration estimate.
pub fn gas_summary(readings: &GasReadings) -> Summary {
    if !readings.has_ratio() {
        return mq9_summary(f32::NAN);
    }
    render(format_args!(
        "Rs/R0: {:.3}  CO: {} ppm",
        readings.ratio(),
        readings.ppm
    ))
}

impl SensorValues {
    /// Summary of the stored sample for `kind`; `"<NAME>: --"` until the
    /// sensor has been read once.
    pub fn summary(&self, kind: SensorKind) -> Summary {
        if !self.has(kind) {
            return render(format_args!("{}: --", kind.name()));
        }

        match kind {
            SensorKind::Sht30 => sht30_summary(&Sht30Readings::from_values(self)),
            SensorKind::Qmp6988 => qmp6988_summary(&Qmp6988Readings::from_values(self)),
            SensorKind::Sgp30 => sgp30_summary(&Sgp30Readings::from_values(self)),
            SensorKind::GroveGas => gas_summary(&GasReadings::from_values(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{GasIndexed, Sht30Indexed};
    use crate::testing::ScriptedSensor;

    #[test]
    fn test_sht30_line() {
        let readings = Sht30Readings {
            temperature_milli_celsius: 23_450,
            humidity_milli_percent: 51_200,
        };
        assert_eq!(sht30_summary(&readings).as_str(), "T: 23.45 C  H: 51.20 %");
    }

    #[test]
    fn test_negative_temperature() {
        let readings = Sht30Readings {
            temperature_milli_celsius: -5_250,
            humidity_milli_percent: 80_000,
        };
        assert_eq!(sht30_summary(&readings).as_str(), "T: -5.25 C  H: 80.00 %");
    }

    #[test]
    fn test_qmp6988_line() {
        let readings = Qmp6988Readings {
            pressure_pa: 101_325,
            temperature_milli_celsius: 23_100,
        };
        assert_eq!(
            qmp6988_summary(&readings).as_str(),
            "P: 1013.25 hPa  T: 23.10 C"
        );
    }

    #[test]
    fn test_sgp30_line() {
        let readings = Sgp30Readings {
            tvoc_ppb: 12,
            eco2_ppm: 400,
        };
        assert_eq!(sgp30_summary(&readings).as_str(), "TVOC: 12 ppb  eCO2: 400 ppm");
    }

    #[test]
    fn test_mq9_line() {
        assert_eq!(mq9_summary(1.002).as_str(), "Rs/R0: 1.002");
        assert_eq!(mq9_summary(f32::INFINITY).as_str(), "Rs/R0: --");
        assert_eq!(mq9_summary(f32::NAN).as_str(), "Rs/R0: --");
    }

    #[test]
    fn test_gas_line_with_estimate() {
        let readings = GasReadings {
            ratio_milli: 150,
            ppm: 312,
        };
        assert_eq!(gas_summary(&readings).as_str(), "Rs/R0: 0.150  CO: 312 ppm");
    }

    #[test]
    fn test_gas_line_without_ratio() {
        let readings = GasReadings::from_ratio(f32::INFINITY, &Default::default());
        assert_eq!(gas_summary(&readings).as_str(), "Rs/R0: --");
    }

    #[test]
    fn test_gas_line_with_huge_finite_ratio_saturates() {
        let readings = GasReadings {
            ratio_milli: i32::MAX,
            ppm: 0,
        };
        assert!(gas_summary(&readings).starts_with("Rs/R0: 2147483.6"));
    }

    #[test]
    fn test_unread_sensor_shows_placeholder() {
        let values = SensorValues::new();
        assert_eq!(values.summary(SensorKind::Sht30).as_str(), "SHT30: --");
        assert_eq!(values.summary(SensorKind::GroveGas).as_str(), "MQ9: --");
    }

    #[test]
    fn test_summary_reads_stored_sample() {
        let mut values = SensorValues::new();
        let mut sht = Sht30Indexed::from(ScriptedSensor::always(Sht30Readings {
            temperature_milli_celsius: 21_000,
            humidity_milli_percent: 45_500,
        }));
        sht.read_into(&mut values).unwrap();
        values.mark_fresh(SensorKind::Sht30);

        let mut gas = GasIndexed::from(ScriptedSensor::always(GasReadings {
            ratio_milli: 998,
            ppm: 0,
        }));
        gas.read_into(&mut values).unwrap();
        values.mark_fresh(SensorKind::GroveGas);

        assert_eq!(
            values.summary(SensorKind::Sht30).as_str(),
            "T: 21.00 C  H: 45.50 %"
        );
        assert_eq!(
            values.summary(SensorKind::GroveGas).as_str(),
            "Rs/R0: 0.998  CO: 0 ppm"
        );
        assert_eq!(values.summary(SensorKind::Sgp30).as_str(), "SGP30: --");
    }

    #[test]
    fn test_summaries_fit_capacity_at_extremes() {
        let readings = Sht30Readings {
            temperature_milli_celsius: i32::MIN,
            humidity_milli_percent: i32::MIN,
        };
        assert!(sht30_summary(&readings).len() <= SUMMARY_CAPACITY);
    }
}
