//! Error page
//!
//! Displays a centered red headline with two white detail lines underneath.

use alloc::string::{String, ToString};
use core::cell::Cell;

use embedded_graphics::{
    Drawable as EgDrawable,
    geometry::Point,
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Text},
};

use crate::report::ErrorReport;
use crate::ui::{
    DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, Drawable, FONT_10X20_CHAR_HEIGHT_PX, display_bounds,
};

/// Error page that displays the two lines of an [`ErrorReport`]
pub struct ErrorPage {
    /// Whether the page needs to be redrawn
    dirty: Cell<bool>,
    headline: String,
    detail: String,
}

impl ErrorPage {
    pub fn new(headline: &str, detail: &str) -> Self {
        Self {
            dirty: Cell::new(true),
            headline: headline.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn from_report(report: &ErrorReport<'_>) -> Self {
        Self::new(report.display_lines[0], report.display_lines[1])
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl Drawable for ErrorPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        if !self.dirty.get() {
            return Ok(());
        }

        display.clear(Rgb565::BLACK)?;

        let center_x = (DISPLAY_WIDTH_PX / 2) as i32;
        let center_y = (DISPLAY_HEIGHT_PX / 2) as i32;

        // Headline one line-height above center
        EgDrawable::draw(
            &Text::with_alignment(
                &self.headline,
                Point::new(center_x, center_y - FONT_10X20_CHAR_HEIGHT_PX as i32),
                MonoTextStyle::new(&FONT_10X20, Rgb565::RED),
                Alignment::Center,
            ),
            display,
        )?;

        // Detail one line-height below center
        EgDrawable::draw(
            &Text::with_alignment(
                &self.detail,
                Point::new(center_x, center_y + FONT_10X20_CHAR_HEIGHT_PX as i32),
                MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE),
                Alignment::Center,
            ),
            display,
        )?;

        self.dirty.set(false);
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        display_bounds()
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn mark_clean(&mut self) {
        self.dirty.set(false);
    }

    fn mark_dirty(&mut self) {
        self.dirty.set(true);
    }
}
