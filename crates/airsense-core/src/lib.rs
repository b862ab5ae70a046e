//! Hardware-independent core library for airsense
//!
//! This crate contains the platform-agnostic logic for the airsense
//! multi-sensor environment board: sensor trait definitions, the resistive
//! gas sensor calibration and ratio estimator, per-sensor sampling schedule,
//! reading summaries, error reporting and the display pages.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod pages;
pub mod report;
pub mod sampling;
pub mod sensors;
pub mod station;
pub mod summary;
pub mod ui;

#[cfg(test)]
mod testing;

pub use config::{BoardConfig, ConfigError, GasSensorConfig, SamplingConfig};
pub use report::{ErrorReport, ErrorReporter, LogReporter, ScreenReporter};
pub use sampling::SamplingSchedule;
pub use sensors::{
    AnalogInput, AnalogPin, GasSensorError, GasSensorEstimator, GroveGasSensor, Sensor,
    SensorError, SensorKind, SensorValues, TransferFunction,
};
pub use station::{PollReport, Station, StationState};
