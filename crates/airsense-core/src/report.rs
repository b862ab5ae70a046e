//! Error reporting
//!
//! Failures surface from the sensors as `Result`s; the station hands each one
//! to an [`ErrorReporter`], which decides where it ends up (the log, the
//! screen, or both).

use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::error;

use crate::pages::ErrorPage;
use crate::ui::Drawable;

/// A short machine-oriented message plus two lines meant for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorReport<'a> {
    pub message: &'a str,
    pub display_lines: [&'a str; 2],
}

impl<'a> ErrorReport<'a> {
    pub const fn new(message: &'a str, line1: &'a str, line2: &'a str) -> Self {
        Self {
            message,
            display_lines: [line1, line2],
        }
    }
}

pub trait ErrorReporter {
    fn report(&mut self, report: &ErrorReport<'_>);
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for &mut R {
    fn report(&mut self, report: &ErrorReport<'_>) {
        (**self).report(report);
    }
}

/// Fan a report out to two reporters, first `A` then `B`.
impl<A: ErrorReporter, B: ErrorReporter> ErrorReporter for (A, B) {
    fn report(&mut self, report: &ErrorReport<'_>) {
        self.0.report(report);
        self.1.report(report);
    }
}

/// Writes every report to the `log` facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&mut self, report: &ErrorReport<'_>) {
        error!(
            "{} ({}: {})",
            report.message, report.display_lines[0], report.display_lines[1]
        );
    }
}

/// Shows the latest report as a full-screen [`ErrorPage`].
pub struct ScreenReporter<D> {
    display: D,
    page: Option<ErrorPage>,
}

impl<D> ScreenReporter<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: fmt::Debug,
{
    pub fn new(display: D) -> Self {
        Self {
            display,
            page: None,
        }
    }

    /// Page for the most recent report, if any
    pub fn page(&self) -> Option<&ErrorPage> {
        self.page.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_inner(self) -> D {
        self.display
    }
}

impl<D> ErrorReporter for ScreenReporter<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: fmt::Debug,
{
    fn report(&mut self, report: &ErrorReport<'_>) {
        let page = ErrorPage::from_report(report);
        // Render faults are logged only; the report itself has been delivered.
        if let Err(e) = page.draw(&mut self.display) {
            error!("Error page render error: {:?}", e);
        }
        self.page = Some(page);
    }
}
