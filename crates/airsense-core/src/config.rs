//! Board configuration
//!
//! Everything the board firmware treats as a tuning constant lives here: the
//! gas sensor's voltage divider, ADC range and calibration cadence, and the
//! polling interval of every sensor. Defaults match the reference board; a
//! provisioned blob can override them through [`BoardConfig::from_bytes`].

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::sensors::{AnalogPin, SensorKind, TransferFunction};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("supply voltage must be positive (got {0})")]
    SupplyVoltage(f32),
    #[error("load resistance must be positive (got {0} ohms)")]
    LoadResistance(f32),
    #[error("ADC full-scale value must be at least 2 (got {0})")]
    AdcRange(u16),
    #[error("calibration needs at least one sample")]
    NoCalibrationSamples,
    #[error("sampling interval for {0} must be non-zero")]
    ZeroInterval(&'static str),
    #[error("config blob could not be decoded")]
    Decode,
    #[error("config could not be encoded")]
    Encode,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct BoardConfig {
    pub gas: GasSensorConfig,
    pub sampling: SamplingConfig,
}

impl BoardConfig {
    /// Check every field that would make calibration or scheduling degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gas.validate()?;
        self.sampling.validate()
    }

    /// Decode and validate a postcard-encoded config blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|e| {
            log::error!("Failed to decode board config: {:?}", e);
            ConfigError::Decode
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|e| {
            log::error!("Failed to encode board config: {:?}", e);
            ConfigError::Encode
        })
    }
}

/// Wiring and calibration constants for the analog gas sensor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GasSensorConfig {
    /// Analog input the sensor's divider output is wired to
    pub pin: u8,
    /// Divider supply voltage (V)
    pub supply_voltage: f32,
    /// Load resistor on the low side of the divider (ohms)
    pub load_resistance_ohms: f32,
    /// ADC full-scale raw value
    pub adc_max: u16,
    /// Blocking wait between calibration samples (ms)
    pub sample_delay_ms: u32,
    /// Samples averaged into the baseline resistance
    pub calibration_iterations: u16,
}

impl Default for GasSensorConfig {
    fn default() -> Self {
        Self {
            pin: 36,
            supply_voltage: 3.3,
            load_resistance_ohms: 10_000.0,
            adc_max: 4095,
            sample_delay_ms: 20,
            calibration_iterations: 100,
        }
    }
}

impl GasSensorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.supply_voltage.is_finite() || self.supply_voltage <= 0.0 {
            return Err(ConfigError::SupplyVoltage(self.supply_voltage));
        }
        if !self.load_resistance_ohms.is_finite() || self.load_resistance_ohms <= 0.0 {
            return Err(ConfigError::LoadResistance(self.load_resistance_ohms));
        }
        if self.adc_max < 2 {
            return Err(ConfigError::AdcRange(self.adc_max));
        }
        if self.calibration_iterations == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }
        Ok(())
    }

    pub const fn pin(&self) -> AnalogPin {
        AnalogPin(self.pin)
    }

    pub const fn transfer_function(&self) -> TransferFunction {
        TransferFunction::new(self.supply_voltage, self.load_resistance_ohms, self.adc_max)
    }
}

/// Polling interval of each sensor slot, in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    pub sht30_interval_ms: u32,
    pub qmp6988_interval_ms: u32,
    /// The SGP30 baseline algorithm expects a 1 Hz cadence
    pub sgp30_interval_ms: u32,
    pub gas_interval_ms: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sht30_interval_ms: 2000,
            qmp6988_interval_ms: 2000,
            sgp30_interval_ms: 1000,
            gas_interval_ms: 1000,
        }
    }
}

impl SamplingConfig {
    pub const fn interval_ms(&self, kind: SensorKind) -> u32 {
        match kind {
            SensorKind::Sht30 => self.sht30_interval_ms,
            SensorKind::Qmp6988 => self.qmp6988_interval_ms,
            SensorKind::Sgp30 => self.sgp30_interval_ms,
            SensorKind::GroveGas => self.gas_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in SensorKind::ALL {
            if self.interval_ms(kind) == 0 {
                return Err(ConfigError::ZeroInterval(kind.name()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(BoardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_transfer_function_matches_board() {
        let transfer = GasSensorConfig::default().transfer_function();
        assert_eq!(transfer.adc_max(), 4095);
        assert_eq!(transfer.load_resistance_ohms(), 10_000.0);
    }

    #[test]
    fn test_rejects_degenerate_gas_config() {
        let mut gas = GasSensorConfig::default();
        gas.calibration_iterations = 0;
        assert_eq!(gas.validate(), Err(ConfigError::NoCalibrationSamples));

        let mut gas = GasSensorConfig::default();
        gas.load_resistance_ohms = 0.0;
        assert_eq!(gas.validate(), Err(ConfigError::LoadResistance(0.0)));

        let mut gas = GasSensorConfig::default();
        gas.supply_voltage = f32::NAN;
        assert!(matches!(gas.validate(), Err(ConfigError::SupplyVoltage(_))));

        let mut gas = GasSensorConfig::default();
        gas.adc_max = 1;
        assert_eq!(gas.validate(), Err(ConfigError::AdcRange(1)));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = BoardConfig::default();
        config.sampling.sgp30_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval("SGP30")));
    }

    #[test]
    fn test_blob_round_trip_preserves_overrides() {
        let mut config = BoardConfig::default();
        config.gas.pin = 33;
        config.gas.calibration_iterations = 5;
        config.sampling.gas_interval_ms = 250;

        let bytes = config.to_bytes().unwrap();
        assert_eq!(BoardConfig::from_bytes(&bytes), Ok(config));
    }

    #[test]
    fn test_blob_with_invalid_values_is_rejected() {
        let mut config = BoardConfig::default();
        config.gas.calibration_iterations = 0;
        let bytes = config.to_bytes().unwrap();

        assert_eq!(
            BoardConfig::from_bytes(&bytes),
            Err(ConfigError::NoCalibrationSamples)
        );
    }

    #[test]
    fn test_truncated_blob_fails_to_decode() {
        let bytes = BoardConfig::default().to_bytes().unwrap();
        assert_eq!(
            BoardConfig::from_bytes(&bytes[..3]),
            Err(ConfigError::Decode)
        );
    }
}
