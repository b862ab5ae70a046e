//! Resistive gas sensor: baseline calibration and Rs/R0 estimation
//!
//! The sensor element sits on the high side of a voltage divider with a fixed
//! load resistor to ground, and the ADC samples the midpoint. Sensor
//! resistance follows from the divider equation:
//!
//! ```text
//! Vout = Vcc * raw / adc_max
//! Rs   = RL * (Vcc - Vout) / Vout = RL * (adc_max - raw) / raw
//! ```
//!
//! Calibration averages Rs over a burst of samples in clean air to get the
//! baseline R0; every later measurement reports Rs / R0.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use super::{
    AnalogInput, AnalogPin, ConcentrationCurve, Sensor, SensorError, SensorKind, SensorReadings,
    round_to_i32,
};
use crate::config::GasSensorConfig;

const SENSOR_NAME: &str = SensorKind::GroveGas.name();

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasSensorError<E: fmt::Debug> {
    #[error("calibration failed: no usable sample out of {attempted}")]
    CalibrationFailed { attempted: u16 },
    #[error("baseline resistance is zero or invalid; calibrate before measuring")]
    DivideByZero,
    #[error("analog input railed at {raw}")]
    Railed { raw: u16 },
    #[error("analog read failed on pin {pin}: {cause:?}")]
    HardwareRead { pin: AnalogPin, cause: E },
}

impl<E: fmt::Debug> From<GasSensorError<E>> for SensorError {
    fn from(err: GasSensorError<E>) -> Self {
        match err {
            GasSensorError::CalibrationFailed { attempted } => SensorError::CalibrationFailed {
                sensor: SENSOR_NAME,
                attempted,
            },
            GasSensorError::DivideByZero => SensorError::DivideByZero {
                sensor: SENSOR_NAME,
            },
            GasSensorError::Railed { .. } => SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "measure",
                details: "analog input railed",
            },
            GasSensorError::HardwareRead { .. } => SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "analog read",
                details: "ADC conversion fault",
            },
        }
    }
}

/// Divider transfer function from raw ADC counts to sensor resistance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferFunction {
    supply_voltage: f32,
    load_resistance_ohms: f32,
    adc_max: u16,
}

impl TransferFunction {
    pub const fn new(supply_voltage: f32, load_resistance_ohms: f32, adc_max: u16) -> Self {
        Self {
            supply_voltage,
            load_resistance_ohms,
            adc_max,
        }
    }

    pub const fn supply_voltage(&self) -> f32 {
        self.supply_voltage
    }

    pub const fn load_resistance_ohms(&self) -> f32 {
        self.load_resistance_ohms
    }

    pub const fn adc_max(&self) -> u16 {
        self.adc_max
    }

    /// Divider midpoint voltage for a raw sample
    pub fn voltage(&self, raw: u16) -> f32 {
        raw as f32 / self.adc_max as f32 * self.supply_voltage
    }

    /// A sample pinned to either rail carries no resistance information.
    pub const fn is_railed(&self, raw: u16) -> bool {
        raw == 0 || raw >= self.adc_max
    }

    /// Sensor resistance in ohms.
    ///
    /// Written in count space so the supply voltage cancels; `raw == 0` gives
    /// `+inf` and `raw >= adc_max` gives `0.0`.
    pub fn resistance(&self, raw: u16) -> f32 {
        if raw >= self.adc_max {
            return 0.0;
        }
        if raw == 0 {
            return f32::INFINITY;
        }
        self.load_resistance_ohms * (self.adc_max - raw) as f32 / raw as f32
    }
}

/// Calibration and measurement routine for one resistive gas sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasSensorEstimator {
    transfer: TransferFunction,
    sample_delay_ms: u32,
}

impl GasSensorEstimator {
    pub const fn new(transfer: TransferFunction, sample_delay_ms: u32) -> Self {
        Self {
            transfer,
            sample_delay_ms,
        }
    }

    pub const fn from_config(config: &GasSensorConfig) -> Self {
        Self::new(config.transfer_function(), config.sample_delay_ms)
    }

    pub const fn transfer(&self) -> &TransferFunction {
        &self.transfer
    }

    /// Average the sensor resistance over `iterations` samples.
    ///
    /// Samples pinned to a rail are left out of the mean. If none are usable
    /// (or `iterations` is zero) the baseline would be 0 or infinite, so the
    /// call fails with [`GasSensorError::CalibrationFailed`]. An ADC fault
    /// aborts immediately and is returned as-is.
    pub fn calibrate<A, D>(
        &self,
        adc: &mut A,
        delay: &mut D,
        pin: AnalogPin,
        iterations: u16,
    ) -> Result<f32, GasSensorError<A::Error>>
    where
        A: AnalogInput,
        D: DelayNs,
    {
        let mut sum = 0.0_f32;
        let mut usable: u16 = 0;

        for i in 0..iterations {
            if i > 0 {
                delay.delay_ms(self.sample_delay_ms);
            }

            let raw = self.sample(adc, pin)?;
            if self.transfer.is_railed(raw) {
                warn!("{}: calibration sample {} railed at {}", SENSOR_NAME, i, raw);
                continue;
            }

            let resistance = self.transfer.resistance(raw);
            debug!(
                "{}: calibration sample {} raw={} rs={} ohm",
                SENSOR_NAME, i, raw, resistance
            );
            sum += resistance;
            usable += 1;
        }

        if usable == 0 {
            error!(
                "{}: calibration produced no usable sample ({} attempted)",
                SENSOR_NAME, iterations
            );
            return Err(GasSensorError::CalibrationFailed {
                attempted: iterations,
            });
        }

        let r0 = sum / usable as f32;
        info!(
            "{}: calibrated R0={} ohm from {}/{} samples",
            SENSOR_NAME, r0, usable, iterations
        );
        Ok(r0)
    }

    /// Rs / R0 for a single fresh sample.
    ///
    /// Fails fast with [`GasSensorError::DivideByZero`] when `r0` is zero,
    /// negative or not finite, before touching the ADC. A sample pinned to
    /// either rail has no meaningful ratio and fails with
    /// [`GasSensorError::Railed`].
    pub fn measure<A>(
        &self,
        adc: &mut A,
        pin: AnalogPin,
        r0: f32,
    ) -> Result<f32, GasSensorError<A::Error>>
    where
        A: AnalogInput,
    {
        if !is_valid_baseline(r0) {
            error!("{}: measure called without a valid baseline ({})", SENSOR_NAME, r0);
            return Err(GasSensorError::DivideByZero);
        }

        let raw = self.sample(adc, pin)?;
        if self.transfer.is_railed(raw) {
            error!("{}: measurement railed at {}", SENSOR_NAME, raw);
            return Err(GasSensorError::Railed { raw });
        }

        let ratio = self.transfer.resistance(raw) / r0;
        debug!("{}: raw={} ratio={}", SENSOR_NAME, raw, ratio);
        Ok(ratio)
    }

    fn sample<A: AnalogInput>(
        &self,
        adc: &mut A,
        pin: AnalogPin,
    ) -> Result<u16, GasSensorError<A::Error>> {
        adc.read_raw(pin).map_err(|cause| {
            error!("{}: analog read on {} failed: {:?}", SENSOR_NAME, pin, cause);
            GasSensorError::HardwareRead { pin, cause }
        })
    }
}

/// Calibration phase of a gas sensor. The only way into `Calibrated` is a
/// successful calibration (or restoring a known baseline).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Calibration {
    #[default]
    Uncalibrated,
    Calibrated { r0_ohms: f32 },
}

impl Calibration {
    /// Baseline used for measurement; 0 while uncalibrated.
    pub const fn r0(&self) -> f32 {
        match self {
            Self::Uncalibrated => 0.0,
            Self::Calibrated { r0_ohms } => *r0_ohms,
        }
    }

    pub const fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }
}

/// Typed readings from the gas sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasReadings {
    /// Rs / R0 scaled by 1000
    pub ratio_milli: i32,
    /// Estimated concentration on the configured curve
    pub ppm: i32,
}

impl GasReadings {
    /// Stored in place of a ratio that is NaN or infinite
    pub const NO_RATIO: i32 = i32::MIN;

    pub fn from_ratio(ratio: f32, curve: &ConcentrationCurve) -> Self {
        if !ratio.is_finite() {
            return Self {
                ratio_milli: Self::NO_RATIO,
                ppm: 0,
            };
        }
        Self {
            ratio_milli: round_to_i32(ratio * 1000.0),
            ppm: round_to_i32(curve.estimate_ppm(ratio).unwrap_or(0.0)),
        }
    }

    pub const fn has_ratio(&self) -> bool {
        self.ratio_milli != Self::NO_RATIO
    }

    pub(crate) const fn from_values(values: &super::SensorValues) -> Self {
        Self {
            ratio_milli: values.get(super::GAS_RATIO),
            ppm: values.get(super::GAS_PPM),
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio_milli as f32 / 1000.0
    }
}

impl SensorReadings<2> for GasReadings {
    fn to_array(self) -> [i32; 2] {
        [self.ratio_milli, self.ppm]
    }
}

fn is_valid_baseline(r0_ohms: f32) -> bool {
    r0_ohms.is_finite() && r0_ohms > 0.0
}

/// Grove carrier board with an MQ-9 element on an analog pin.
///
/// Owns its ADC handle, the delay used between calibration samples and the
/// calibration state, so no baseline lives outside the sensor object.
pub struct GroveGasSensor<A, D> {
    adc: A,
    delay: D,
    estimator: GasSensorEstimator,
    pin: AnalogPin,
    iterations: u16,
    curve: ConcentrationCurve,
    calibration: Calibration,
}

impl<A: AnalogInput, D: DelayNs> GroveGasSensor<A, D> {
    pub fn new(adc: A, delay: D, config: &GasSensorConfig) -> Self {
        Self {
            adc,
            delay,
            estimator: GasSensorEstimator::from_config(config),
            pin: config.pin(),
            iterations: config.calibration_iterations,
            curve: ConcentrationCurve::default(),
            calibration: Calibration::Uncalibrated,
        }
    }

    pub fn with_curve(mut self, curve: ConcentrationCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Run (or re-run) baseline calibration.
    ///
    /// A failed attempt leaves the previous calibration in place.
    pub fn calibrate(&mut self) -> Result<f32, GasSensorError<A::Error>> {
        let r0 = self.estimator.calibrate(
            &mut self.adc,
            &mut self.delay,
            self.pin,
            self.iterations,
        )?;
        self.calibration = Calibration::Calibrated { r0_ohms: r0 };
        Ok(r0)
    }

    /// Adopt a baseline measured earlier, e.g. one kept across a warm reboot.
    ///
    /// Zero, negative and non-finite values are refused.
    pub fn restore_baseline(&mut self, r0_ohms: f32) -> bool {
        if !is_valid_baseline(r0_ohms) {
            warn!("{}: refusing baseline {}", SENSOR_NAME, r0_ohms);
            return false;
        }
        self.calibration = Calibration::Calibrated { r0_ohms };
        true
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// R0 in ohms once calibrated
    pub fn baseline(&self) -> Option<f32> {
        match self.calibration {
            Calibration::Calibrated { r0_ohms } => Some(r0_ohms),
            Calibration::Uncalibrated => None,
        }
    }

    /// Current Rs / R0.
    pub fn ratio(&mut self) -> Result<f32, GasSensorError<A::Error>> {
        self.estimator
            .measure(&mut self.adc, self.pin, self.calibration.r0())
    }

    pub fn curve(&self) -> &ConcentrationCurve {
        &self.curve
    }

    pub fn pin(&self) -> AnalogPin {
        self.pin
    }
}

impl<A: AnalogInput, D: DelayNs> Sensor<2> for GroveGasSensor<A, D> {
    type Readings = GasReadings;

    fn read(&mut self) -> Result<GasReadings, SensorError> {
        let ratio = self.ratio()?;
        Ok(GasReadings::from_ratio(ratio, &self.curve))
    }
}
