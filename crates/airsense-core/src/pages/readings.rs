//! Readings page
//!
//! One block per sensor: a small grey label with the sensor name and its
//! summary line underneath.

use core::cell::Cell;

use embedded_graphics::{
    Drawable as EgDrawable,
    geometry::Point,
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Baseline, Text},
};

use crate::sensors::{SensorKind, SensorValues};
use crate::summary::Summary;
use crate::ui::{Drawable, FONT_6X10_CHAR_HEIGHT_PX, FONT_10X20_CHAR_HEIGHT_PX, display_bounds};

const TITLE: &str = "airsense";
const MARGIN_PX: i32 = 8;
const TITLE_HEIGHT_PX: i32 = 32;
const BLOCK_SPACING_PX: i32 = 6;

pub struct ReadingsPage {
    dirty: Cell<bool>,
    lines: [Summary; SensorKind::COUNT],
}

impl ReadingsPage {
    pub fn new() -> Self {
        Self::from_values(&SensorValues::new())
    }

    pub fn from_values(values: &SensorValues) -> Self {
        Self {
            dirty: Cell::new(true),
            lines: SensorKind::ALL.map(|kind| values.summary(kind)),
        }
    }

    /// Refresh the lines; the page only becomes dirty if one changed.
    pub fn update(&mut self, values: &SensorValues) {
        for kind in SensorKind::ALL {
            let line = values.summary(kind);
            if self.lines[kind.slot()] != line {
                self.lines[kind.slot()] = line;
                self.dirty.set(true);
            }
        }
    }

    pub fn line(&self, kind: SensorKind) -> &str {
        self.lines[kind.slot()].as_str()
    }

    fn block_top(slot: usize) -> i32 {
        let block_height = (FONT_6X10_CHAR_HEIGHT_PX + FONT_10X20_CHAR_HEIGHT_PX) as i32
            + BLOCK_SPACING_PX;
        TITLE_HEIGHT_PX + slot as i32 * block_height
    }
}

impl Default for ReadingsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for ReadingsPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        if !self.dirty.get() {
            return Ok(());
        }

        display.clear(Rgb565::BLACK)?;

        let center_x = display_bounds().center().x;
        EgDrawable::draw(
            &Text::with_alignment(
                TITLE,
                Point::new(center_x, MARGIN_PX + FONT_10X20_CHAR_HEIGHT_PX as i32 - 4),
                MonoTextStyle::new(&FONT_10X20, Rgb565::CSS_LIGHT_BLUE),
                Alignment::Center,
            ),
            display,
        )?;

        let label_style = MonoTextStyle::new(&FONT_6X10, Rgb565::CSS_GRAY);
        let value_style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);

        for kind in SensorKind::ALL {
            let top = Self::block_top(kind.slot());

            EgDrawable::draw(
                &Text::with_baseline(
                    kind.name(),
                    Point::new(MARGIN_PX, top),
                    label_style,
                    Baseline::Top,
                ),
                display,
            )?;
            EgDrawable::draw(
                &Text::with_baseline(
                    self.lines[kind.slot()].as_str(),
                    Point::new(MARGIN_PX, top + FONT_6X10_CHAR_HEIGHT_PX as i32),
                    value_style,
                    Baseline::Top,
                ),
                display,
            )?;
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{Sgp30Indexed, Sgp30Readings};
    use crate::testing::{PixelCounter, ScriptedSensor};

    #[test]
    fn test_new_page_shows_placeholders() {
        let page = ReadingsPage::new();
        assert_eq!(page.line(SensorKind::Qmp6988), "QMP6988: --");
        assert!(page.is_dirty());
    }

    #[test]
    fn test_update_marks_dirty_only_on_change() {
        let mut page = ReadingsPage::new();
        let mut display = PixelCounter::new(320, 240);
        page.draw(&mut display).unwrap();
        assert!(!page.is_dirty());

        let mut values = SensorValues::new();
        page.update(&values);
        assert!(!page.is_dirty());

        let mut sgp = Sgp30Indexed::from(ScriptedSensor::always(Sgp30Readings {
            tvoc_ppb: 5,
            eco2_ppm: 410,
        }));
        sgp.read_into(&mut values).unwrap();
        values.mark_fresh(SensorKind::Sgp30);
        page.update(&values);

        assert!(page.is_dirty());
        assert_eq!(page.line(SensorKind::Sgp30), "TVOC: 5 ppb  eCO2: 410 ppm");
    }

    #[test]
    fn test_blocks_fit_on_screen() {
        let last = ReadingsPage::block_top(SensorKind::COUNT - 1)
            + (FONT_6X10_CHAR_HEIGHT_PX + FONT_10X20_CHAR_HEIGHT_PX) as i32;
        assert!(last <= display_bounds().size.height as i32);
    }

    #[test]
    fn test_draw_uses_title_and_value_colors() {
        let page = ReadingsPage::new();
        let mut display = PixelCounter::new(320, 240);
        page.draw(&mut display).unwrap();
        assert!(display.saw(Rgb565::CSS_LIGHT_BLUE));
        assert!(display.saw(Rgb565::WHITE));
        assert!(display.saw(Rgb565::CSS_GRAY));
    }
}
