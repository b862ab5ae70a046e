//! Analog input port
//!
//! `embedded-hal` 1.0 has no ADC trait, so the board supplies one through
//! [`AnalogInput`]. Implementations sample a single line and return the raw
//! conversion result in `0..=adc_max`.

use core::fmt;

/// Identifier of an analog input line (the GPIO / channel number on the board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalogPin(pub u8);

impl fmt::Display for AnalogPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

pub trait AnalogInput {
    /// Fault reported by the converter. Passed through to callers untouched.
    type Error: fmt::Debug;

    /// Take one conversion on `pin`.
    fn read_raw(&mut self, pin: AnalogPin) -> Result<u16, Self::Error>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    type Error = T::Error;

    fn read_raw(&mut self, pin: AnalogPin) -> Result<u16, Self::Error> {
        (**self).read_raw(pin)
    }
}
