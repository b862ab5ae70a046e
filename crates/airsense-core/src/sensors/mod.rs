mod analog;
mod curve;
mod gas;
mod qmp6988;
mod sgp30;
mod sht30;

pub use analog::{AnalogInput, AnalogPin};
pub use curve::{ConcentrationCurve, CurvePoint};
pub use gas::{
    Calibration, GasReadings, GasSensorError, GasSensorEstimator, GroveGasSensor,
    TransferFunction,
};
pub use qmp6988::Qmp6988Readings;
pub use sgp30::Sgp30Readings;
pub use sht30::Sht30Readings;

use core::marker::PhantomData;
use thiserror_no_std::Error;

/// Number of fixed-point values held in one [`SensorValues`] sample
pub const MAX_VALUES: usize = 8;

/// Round half away from zero; every fixed-point conversion goes through this.
/// Out-of-range values saturate. `f32::round` lives in std.
pub(crate) fn round_to_i32(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: initialization failed ({details})")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: calibration failed, no usable sample out of {attempted}")]
    CalibrationFailed { sensor: &'static str, attempted: u16 },
    #[error("{sensor}: baseline resistance is zero or invalid, calibrate before measuring")]
    DivideByZero { sensor: &'static str },
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array.
    fn to_array(self) -> [i32; COUNT];
}

/// Trait for sensors that produce typed readings.
///
/// Reads are blocking; the control loop never has more than one in flight.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> Result<Self::Readings, SensorError>;
}

/// The four sensor slots on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Temperature / humidity
    Sht30,
    /// Barometric pressure
    Qmp6988,
    /// TVOC / eCO2
    Sgp30,
    /// Analog resistive gas sensor (MQ-9 on a Grove carrier)
    GroveGas,
}

impl SensorKind {
    pub const COUNT: usize = 4;

    pub const ALL: [SensorKind; Self::COUNT] = [
        SensorKind::Sht30,
        SensorKind::Qmp6988,
        SensorKind::Sgp30,
        SensorKind::GroveGas,
    ];

    /// Slot position, used to index per-sensor state arrays
    pub const fn slot(self) -> usize {
        match self {
            Self::Sht30 => 0,
            Self::Qmp6988 => 1,
            Self::Sgp30 => 2,
            Self::GroveGas => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sht30 => "SHT30",
            Self::Qmp6988 => "QMP6988",
            Self::Sgp30 => "SGP30",
            Self::GroveGas => "MQ9",
        }
    }
}

// Type-level index markers
pub struct Idx<const N: usize>;

pub struct IndexedSensor<S, const START: usize, const COUNT: usize>
where
    S: Sensor<COUNT>,
{
    sensor: S,
    _marker: PhantomData<Idx<START>>,
}

impl<S, const START: usize, const COUNT: usize> From<S> for IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl<S, const START: usize, const COUNT: usize> IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    pub const fn new(sensor: S) -> Self {
        Self {
            sensor,
            _marker: PhantomData,
        }
    }

    /// Read and write to the values array at the correct indices.
    /// Type safety ensures the readings are stored at the declared START position.
    pub fn read_into(&mut self, values: &mut SensorValues) -> Result<(), SensorError> {
        let readings = self.sensor.read()?;
        let data = readings.to_array();
        values.raw[START..START + COUNT].copy_from_slice(&data);
        Ok(())
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Get the starting index where this sensor's data is stored.
    pub const fn start_index() -> usize {
        START
    }

    /// Get the number of values this sensor produces.
    pub const fn value_count() -> usize {
        COUNT
    }

    /// Get the absolute index for a specific reading within this sensor.
    pub const fn reading_index(offset: usize) -> usize {
        START + offset
    }
}

/// Latest fixed-point sample of every sensor, plus which slots hold real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorValues {
    raw: [i32; MAX_VALUES],
    fresh: [bool; SensorKind::COUNT],
}

impl SensorValues {
    pub const fn new() -> Self {
        Self {
            raw: [0; MAX_VALUES],
            fresh: [false; SensorKind::COUNT],
        }
    }

    /// Value at one of the [`indices`] constants
    pub const fn get(&self, index: usize) -> i32 {
        self.raw[index]
    }

    pub const fn raw(&self) -> &[i32; MAX_VALUES] {
        &self.raw
    }

    /// Whether `kind` has been read successfully at least once
    pub const fn has(&self, kind: SensorKind) -> bool {
        self.fresh[kind.slot()]
    }

    pub(crate) fn mark_fresh(&mut self, kind: SensorKind) {
        self.fresh[kind.slot()] = true;
    }
}

pub mod indices {
    use crate::sensors::IndexedSensor;

    // The index constants must agree with the START/COUNT of each alias.
    // Nothing checks that at compile time; a mismatch silently mixes up the
    // values of neighbouring sensors.

    pub type Sht30Indexed<S> = IndexedSensor<S, 0, 2>;
    pub type Qmp6988Indexed<S> = IndexedSensor<S, 2, 2>;
    pub type Sgp30Indexed<S> = IndexedSensor<S, 4, 2>;
    pub type GasIndexed<S> = IndexedSensor<S, 6, 2>;

    pub const TEMPERATURE: usize = 0;
    pub const HUMIDITY: usize = 1;
    pub const PRESSURE: usize = 2;
    pub const PRESSURE_TEMPERATURE: usize = 3;
    pub const TVOC: usize = 4;
    pub const ECO2: usize = 5;
    pub const GAS_RATIO: usize = 6;
    pub const GAS_PPM: usize = 7;
}

pub use indices::*;
