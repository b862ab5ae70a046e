//! Desktop simulator for the airsense multi-sensor board.
//!
//! Drives `airsense-core` with synthetic sensors on a simulated millisecond
//! clock. Every poll is logged through `env_logger` (set `RUST_LOG=debug` to
//! see individual calibration samples), and the final screen can be saved as
//! a PNG.
//!
//! The simulated gas line sees a plume in the middle of the run: the sensor
//! resistance drops, so Rs/R0 falls below 1 and the CO estimate rises.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use airsense_core::pages::ReadingsPage;
use airsense_core::sensors::{Qmp6988Readings, Sgp30Readings, Sht30Readings};
use airsense_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, Drawable};
use airsense_core::{
    AnalogInput, AnalogPin, BoardConfig, GroveGasSensor, LogReporter, ScreenReporter, Sensor,
    SensorError, SensorKind, Station, StationState,
};

/// PNG pixel scale factor.
const SNAPSHOT_SCALE: u32 = 2;

/// Raw ADC value of the gas divider in clean air (Rs ~ 24 kOhm).
const CLEAN_AIR_RAW: f64 = 1200.0;

/// Raw ADC value at the peak of the plume (Rs ~ 3.6 kOhm).
const PLUME_PEAK_RAW: f64 = 3000.0;

#[derive(Parser, Debug)]
#[command(name = "airsense-simulator")]
#[command(about = "Run the airsense station against synthetic sensors", long_about = None)]
struct Args {
    /// Number of control-loop ticks to run
    #[arg(long, default_value_t = 40)]
    ticks: u32,

    /// Simulated milliseconds per tick
    #[arg(long, value_name = "MS", default_value_t = 500)]
    tick_ms: u32,

    /// Override the number of gas calibration samples
    #[arg(long, value_name = "N")]
    iterations: Option<u16>,

    /// Sleep for real between ticks and calibration samples
    #[arg(long)]
    realtime: bool,

    /// Pin the gas ADC at full scale so calibration fails
    #[arg(long)]
    saturate_gas: bool,

    /// Postcard-encoded board config to load instead of the defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective board config as a postcard blob
    #[arg(long, value_name = "FILE")]
    dump_config: Option<PathBuf>,

    /// Save the final screen as a PNG
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Synthetic hardware
// ---------------------------------------------------------------------------

/// Simulated millisecond counter shared by every fake sensor.
type Clock = Rc<Cell<u32>>;

fn seconds(clock: &Clock) -> f64 {
    clock.get() as f64 / 1000.0
}

struct SimSht30 {
    clock: Clock,
}

impl Sensor<2> for SimSht30 {
    type Readings = Sht30Readings;

    fn read(&mut self) -> Result<Sht30Readings, SensorError> {
        let t = seconds(&self.clock);
        let temperature = 23.0 + 3.0 * (t / 120.0).sin() + 0.5 * (t / 37.0).cos();
        let humidity = 50.0 + 10.0 * (t / 180.0).sin() + 2.0 * (t / 23.0).cos();
        Ok(Sht30Readings::from_measurement(
            temperature as f32,
            humidity as f32,
        ))
    }
}

struct SimQmp6988 {
    clock: Clock,
}

impl Sensor<2> for SimQmp6988 {
    type Readings = Qmp6988Readings;

    fn read(&mut self) -> Result<Qmp6988Readings, SensorError> {
        let t = seconds(&self.clock);
        let pressure = 101_325.0 + 150.0 * (t / 600.0).sin();
        let temperature = 23.4 + 2.5 * (t / 120.0).sin();
        Ok(Qmp6988Readings::from_measurement(
            pressure as f32,
            temperature as f32,
        ))
    }
}

struct SimSgp30 {
    clock: Clock,
}

impl Sensor<2> for SimSgp30 {
    type Readings = Sgp30Readings;

    fn read(&mut self) -> Result<Sgp30Readings, SensorError> {
        let t = seconds(&self.clock);
        let tvoc = 40.0 + 30.0 * (t / 90.0).sin();
        let eco2 = 600.0 + 200.0 * (t / 300.0).sin() + 30.0 * (t / 41.0).cos();
        Ok(Sgp30Readings {
            tvoc_ppb: tvoc.max(0.0) as i32,
            eco2_ppm: eco2.max(400.0) as i32,
        })
    }
}

/// Gas divider output with a plume between `plume_start_ms` and `plume_end_ms`.
struct SimGasAdc {
    clock: Clock,
    adc_max: u16,
    plume_start_ms: u32,
    plume_end_ms: u32,
    saturated: bool,
}

impl SimGasAdc {
    fn raw_at(&self, now_ms: u32) -> u16 {
        if self.saturated {
            return self.adc_max;
        }

        let ripple = 8.0 * (now_ms as f64 / 700.0).sin();
        let plume = if now_ms > self.plume_start_ms && now_ms < self.plume_end_ms {
            let span = (self.plume_end_ms - self.plume_start_ms) as f64;
            let phase = (now_ms - self.plume_start_ms) as f64 / span;
            (phase * std::f64::consts::PI).sin()
        } else {
            0.0
        };

        let raw = CLEAN_AIR_RAW + (PLUME_PEAK_RAW - CLEAN_AIR_RAW) * plume + ripple;
        raw.clamp(1.0, self.adc_max as f64 - 1.0) as u16
    }
}

impl AnalogInput for SimGasAdc {
    type Error = core::convert::Infallible;

    fn read_raw(&mut self, _pin: AnalogPin) -> Result<u16, Self::Error> {
        Ok(self.raw_at(self.clock.get()))
    }
}

/// Blocking delay that only sleeps in `--realtime` mode.
struct SimDelay {
    realtime: bool,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        if self.realtime {
            thread::sleep(Duration::from_nanos(ns as u64));
        }
    }
}

// ---------------------------------------------------------------------------
// Config and snapshot helpers
// ---------------------------------------------------------------------------

fn load_config(args: &Args) -> Result<BoardConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let bytes = fs::read(path)
                .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
            BoardConfig::from_bytes(&bytes).map_err(|e| format!("{}: {}", path.display(), e))?
        }
        None => BoardConfig::default(),
    };

    if let Some(iterations) = args.iterations {
        config.gas.calibration_iterations = iterations;
    }
    config.validate().map_err(|e| e.to_string())?;

    if let Some(path) = &args.dump_config {
        let bytes = config.to_bytes().map_err(|e| e.to_string())?;
        fs::write(path, bytes)
            .map_err(|e| format!("cannot write config {}: {}", path.display(), e))?;
        info!("Wrote board config to {}", path.display());
    }

    Ok(config)
}

fn new_display() -> SimulatorDisplay<Rgb565> {
    SimulatorDisplay::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ))
}

fn save_png(display: &SimulatorDisplay<Rgb565>, path: &Path) -> Result<(), String> {
    let output_settings = OutputSettingsBuilder::new().scale(SNAPSHOT_SCALE).build();
    display
        .to_rgb_output_image(&output_settings)
        .save_png(path)
        .map_err(|e| format!("cannot save snapshot {}: {:?}", path.display(), e))?;
    info!("Saved snapshot to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn run(args: &Args) -> Result<(), String> {
    let config = load_config(args)?;
    let run_ms = args.ticks.saturating_mul(args.tick_ms);
    let clock: Clock = Rc::new(Cell::new(0));

    info!(
        "Simulating {} ticks of {} ms, gas plume from {} ms to {} ms",
        args.ticks,
        args.tick_ms,
        run_ms / 5 * 2,
        run_ms / 10 * 7
    );

    let adc = SimGasAdc {
        clock: clock.clone(),
        adc_max: config.gas.adc_max,
        plume_start_ms: run_ms / 5 * 2,
        plume_end_ms: run_ms / 10 * 7,
        saturated: args.saturate_gas,
    };
    let gas = GroveGasSensor::new(
        adc,
        SimDelay {
            realtime: args.realtime,
        },
        &config.gas,
    );

    let mut station = Station::new(
        &config,
        SimSht30 {
            clock: clock.clone(),
        },
        SimQmp6988 {
            clock: clock.clone(),
        },
        SimSgp30 {
            clock: clock.clone(),
        },
        gas,
        (LogReporter, ScreenReporter::new(new_display())),
    );

    match station.start() {
        Ok(r0) => info!("Baseline R0 = {:.1} ohm", r0),
        Err(e) => warn!("Continuing without gas readings: {}", e),
    }

    for tick in 0..args.ticks {
        let now_ms = tick.wrapping_mul(args.tick_ms);
        clock.set(now_ms);

        let report = station.poll(now_ms);
        for kind in report.updated.iter() {
            info!("[{:>6} ms] {}", now_ms, station.summary(*kind));
        }

        if args.realtime {
            thread::sleep(Duration::from_millis(args.tick_ms as u64));
        }
    }

    for kind in SensorKind::ALL {
        info!("{:<8} {}", kind.name(), station.summary(kind));
    }

    if let Some(path) = &args.snapshot {
        if station.state() == StationState::Error {
            save_png(station.reporter().1.display(), path)?;
        } else {
            let mut display = new_display();
            let page = ReadingsPage::from_values(station.values());
            if let Err(e) = page.draw(&mut display) {
                error!("Readings page render error: {:?}", e);
            }
            save_png(&display, path)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    info!("Starting airsense simulator");

    match run(&args) {
        Ok(()) => {
            info!("Simulator exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
