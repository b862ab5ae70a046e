//! Fake hardware shared by the unit tests

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;

use crate::report::{ErrorReport, ErrorReporter};
use crate::sensors::{AnalogInput, AnalogPin, Sensor, SensorError, SensorReadings};

pub fn approx_eq(a: f32, b: f32, rel: f32) -> bool {
    let diff = if a > b { a - b } else { b - a };
    let scale = if b < 0.0 { -b } else { b };
    diff <= rel * scale.max(1.0)
}

pub fn relative_error(actual: f64, expected: f64) -> f64 {
    let err = (actual - expected) / expected;
    if err < 0.0 { -err } else { err }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcFault {
    Timeout,
}

/// ADC that replays a script of raw values, then repeats the last one (or
/// faults forever when built with [`ScriptedAdc::then_fault`]).
pub struct ScriptedAdc {
    script: Vec<u16>,
    next: usize,
    reads: usize,
    fault: Option<AdcFault>,
    pins: Vec<AnalogPin>,
}

impl ScriptedAdc {
    pub fn constant(raw: u16) -> Self {
        Self::sequence(&[raw])
    }

    pub fn sequence(script: &[u16]) -> Self {
        Self {
            script: script.to_vec(),
            next: 0,
            reads: 0,
            fault: None,
            pins: Vec::new(),
        }
    }

    pub fn then_fault(mut self, fault: AdcFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn pins(&self) -> &[AnalogPin] {
        &self.pins
    }
}

impl AnalogInput for ScriptedAdc {
    type Error = AdcFault;

    fn read_raw(&mut self, pin: AnalogPin) -> Result<u16, AdcFault> {
        self.reads += 1;
        self.pins.push(pin);
        if let Some(raw) = self.script.get(self.next) {
            self.next += 1;
            return Ok(*raw);
        }
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.script.last().copied().unwrap_or(0)),
        }
    }
}

#[derive(Default)]
pub struct CountingDelay {
    calls: usize,
    total_ns: u64,
}

impl CountingDelay {
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ns += ms as u64 * 1_000_000;
    }
}

/// Digital sensor returning scripted results, repeating the last one.
pub struct ScriptedSensor<R> {
    script: Vec<Result<R, SensorError>>,
    next: usize,
    reads: usize,
}

impl<R: Copy> ScriptedSensor<R> {
    pub fn always(readings: R) -> Self {
        Self::sequence(&[Ok(readings)])
    }

    pub fn failing(sensor: &'static str) -> Self {
        Self::sequence(&[Err(SensorError::ReadFailed {
            sensor,
            operation: "measure",
            details: "scripted failure",
        })])
    }

    pub fn sequence(script: &[Result<R, SensorError>]) -> Self {
        Self {
            script: script.to_vec(),
            next: 0,
            reads: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl<R, const N: usize> Sensor<N> for ScriptedSensor<R>
where
    R: Copy + SensorReadings<N>,
{
    type Readings = R;

    fn read(&mut self) -> Result<R, SensorError> {
        self.reads += 1;
        let index = self.next.min(self.script.len() - 1);
        self.next += 1;
        self.script[index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReport {
    pub message: String,
    pub display_lines: [String; 2],
}

#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Vec<RecordedReport>,
}

impl ErrorReporter for RecordingReporter {
    fn report(&mut self, report: &ErrorReport<'_>) {
        self.reports.push(RecordedReport {
            message: report.message.to_string(),
            display_lines: [
                report.display_lines[0].to_string(),
                report.display_lines[1].to_string(),
            ],
        });
    }
}

/// Draw target that only counts what lands on it.
pub struct PixelCounter {
    size: Size,
    pub drawn: usize,
    pub clears: usize,
    pub colors: Vec<Rgb565>,
}

impl PixelCounter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            drawn: 0,
            clears: 0,
            colors: Vec::new(),
        }
    }

    pub fn saw(&self, color: Rgb565) -> bool {
        self.colors.contains(&color)
    }
}

impl OriginDimensions for PixelCounter {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for PixelCounter {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if self.bounding_box().contains(point) {
                self.drawn += 1;
                if !self.colors.contains(&color) {
                    self.colors.push(color);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clears += 1;
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
        Ok(())
    }
}
