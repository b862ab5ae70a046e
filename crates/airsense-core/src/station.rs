//! Board control-loop context
//!
//! [`Station`] owns every sensor on the board, the polling schedule, the
//! error reporter and the latest sample. The firmware (or the simulator)
//! calls [`Station::start`] once and then [`Station::poll`] from its main
//! loop with the current millisecond counter.

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::config::BoardConfig;
use crate::report::{ErrorReport, ErrorReporter};
use crate::sampling::{DueSensors, SamplingSchedule};
use crate::sensors::{
    AnalogInput, GasIndexed, GroveGasSensor, Qmp6988Indexed, Sensor, SensorError, SensorKind,
    SensorValues, Sgp30Indexed, Sht30Indexed,
};
use crate::summary::Summary;

const CALIBRATION_FAILED: ErrorReport<'static> =
    ErrorReport::new("gas-calibration", "Gas sensor", "calibration failed");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationState {
    /// Constructed, gas sensor not calibrated yet
    Uninitialized,
    /// Gas baseline calibration in progress
    Calibrating,
    /// Every sensor is polled on its schedule
    Running,
    /// Gas calibration failed; the digital sensors are still polled
    Error,
}

/// Outcome of one [`Station::poll`] call, in slot order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub updated: DueSensors,
    pub failed: DueSensors,
}

impl PollReport {
    /// Nothing was due on this tick.
    pub fn is_idle(&self) -> bool {
        self.updated.is_empty() && self.failed.is_empty()
    }
}

pub struct Station<T, P, V, A, D, R>
where
    T: Sensor<2>,
    P: Sensor<2>,
    V: Sensor<2>,
    A: AnalogInput,
    D: DelayNs,
    R: ErrorReporter,
{
    sht30: Sht30Indexed<T>,
    qmp6988: Qmp6988Indexed<P>,
    sgp30: Sgp30Indexed<V>,
    gas: GasIndexed<GroveGasSensor<A, D>>,
    reporter: R,
    schedule: SamplingSchedule,
    values: SensorValues,
    state: StationState,
}

impl<T, P, V, A, D, R> Station<T, P, V, A, D, R>
where
    T: Sensor<2>,
    P: Sensor<2>,
    V: Sensor<2>,
    A: AnalogInput,
    D: DelayNs,
    R: ErrorReporter,
{
    pub fn new(
        config: &BoardConfig,
        sht30: T,
        qmp6988: P,
        sgp30: V,
        gas: GroveGasSensor<A, D>,
        reporter: R,
    ) -> Self {
        Self {
            sht30: Sht30Indexed::from(sht30),
            qmp6988: Qmp6988Indexed::from(qmp6988),
            sgp30: Sgp30Indexed::from(sgp30),
            gas: GasIndexed::from(gas),
            reporter,
            schedule: SamplingSchedule::new(&config.sampling),
            values: SensorValues::new(),
            state: StationState::Uninitialized,
        }
    }

    /// Calibrate the gas sensor baseline and start polling.
    ///
    /// On failure the error is reported, the station enters
    /// [`StationState::Error`] and only [`Station::recalibrate`] leaves it.
    pub fn start(&mut self) -> Result<f32, SensorError> {
        if self.state != StationState::Uninitialized {
            warn!("Station already started (state {:?})", self.state);
            return Err(SensorError::InitializationFailed {
                sensor: SensorKind::GroveGas.name(),
                details: "station already started",
            });
        }

        info!("Station starting, calibrating gas sensor baseline");
        self.calibrate_gas()
    }

    /// Re-run gas calibration explicitly.
    ///
    /// A failed attempt leaves the station running on the previous baseline
    /// when there is one.
    pub fn recalibrate(&mut self) -> Result<f32, SensorError> {
        info!("Recalibrating gas sensor baseline (state {:?})", self.state);
        self.calibrate_gas()
    }

    /// Adopt a baseline kept from an earlier session instead of calibrating.
    pub fn restore_baseline(&mut self, r0_ohms: f32) -> bool {
        if !self.gas.sensor_mut().restore_baseline(r0_ohms) {
            return false;
        }
        info!("Gas baseline restored: R0 = {} ohm", r0_ohms);
        self.state = StationState::Running;
        true
    }

    fn calibrate_gas(&mut self) -> Result<f32, SensorError> {
        self.state = StationState::Calibrating;

        match self.gas.sensor_mut().calibrate() {
            Ok(r0) => {
                info!("Gas sensor calibrated: R0 = {} ohm", r0);
                self.state = StationState::Running;
                Ok(r0)
            }
            Err(e) => {
                error!("Gas sensor calibration failed: {}", e);
                self.reporter.report(&CALIBRATION_FAILED);
                self.state = if self.gas.sensor().calibration().is_calibrated() {
                    StationState::Running
                } else {
                    StationState::Error
                };
                Err(e.into())
            }
        }
    }

    /// Read every sensor that is due at `now_ms`.
    ///
    /// A failed read is reported and leaves that sensor's previous sample in
    /// place; the remaining sensors are still read.
    pub fn poll(&mut self, now_ms: u32) -> PollReport {
        let mut report = PollReport::default();

        for kind in self.schedule.tick(now_ms) {
            if kind == SensorKind::GroveGas && self.state != StationState::Running {
                debug!("Skipping {} read in state {:?}", kind.name(), self.state);
                continue;
            }

            // Both vectors hold at most one entry per sensor slot.
            match self.read(kind) {
                Ok(()) => {
                    self.values.mark_fresh(kind);
                    debug!("{} -> {}", kind.name(), self.values.summary(kind));
                    let _ = report.updated.push(kind);
                }
                Err(e) => {
                    error!("Failed to read {}: {}", kind.name(), e);
                    self.reporter.report(&ErrorReport::new(
                        read_failure_message(kind),
                        kind.name(),
                        failure_line(&e),
                    ));
                    let _ = report.failed.push(kind);
                }
            }
        }

        report
    }

    fn read(&mut self, kind: SensorKind) -> Result<(), SensorError> {
        match kind {
            SensorKind::Sht30 => self.sht30.read_into(&mut self.values),
            SensorKind::Qmp6988 => self.qmp6988.read_into(&mut self.values),
            SensorKind::Sgp30 => self.sgp30.read_into(&mut self.values),
            SensorKind::GroveGas => self.gas.read_into(&mut self.values),
        }
    }

    /// Summary lines for every sensor, in slot order.
    pub fn summaries(&self) -> [Summary; SensorKind::COUNT] {
        SensorKind::ALL.map(|kind| self.values.summary(kind))
    }

    pub fn summary(&self, kind: SensorKind) -> Summary {
        self.values.summary(kind)
    }

    pub fn values(&self) -> &SensorValues {
        &self.values
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    pub fn gas_sensor(&self) -> &GroveGasSensor<A, D> {
        self.gas.sensor()
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }
}

const fn read_failure_message(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Sht30 => "sht30-read",
        SensorKind::Qmp6988 => "qmp6988-read",
        SensorKind::Sgp30 => "sgp30-read",
        SensorKind::GroveGas => "gas-read",
    }
}

const fn failure_line(err: &SensorError) -> &'static str {
    match err {
        SensorError::ReadFailed { .. } => "read failed",
        SensorError::InitializationFailed { .. } => "not initialized",
        SensorError::CalibrationFailed { .. } => "calibration failed",
        SensorError::DivideByZero { .. } => "not calibrated",
    }
}
