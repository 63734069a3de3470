/*
 *  display/layout.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Face geometry: offsets and fonts for round and rectangular panels
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::mono_font::{ascii, iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Baseline;
use embedded_graphics::text::renderer::TextRenderer;
use profont::{PROFONT_18_POINT, PROFONT_24_POINT};
use serde::{Deserialize, Serialize};

use crate::display::traits::ScreenShape;

/// Per-shape text offsets, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDimensions {
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_offset_round: i32,
    pub y_offset_round: i32,
}

impl Default for FaceDimensions {
    fn default() -> Self {
        Self {
            x_offset: 15,
            y_offset: 90,
            x_offset_round: 25,
            y_offset_round: 100,
        }
    }
}

/// Fonts of the face
#[derive(Clone, Copy)]
pub struct FaceFonts {
    /// Hours, colon and minutes
    pub time: &'static MonoFont<'static>,

    /// Date line
    pub date: &'static MonoFont<'static>,

    /// High temperature (bold)
    pub high_temp: &'static MonoFont<'static>,

    /// Low temperature
    pub low_temp: &'static MonoFont<'static>,
}

impl std::fmt::Debug for FaceFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceFonts")
            .field("time", &self.time.character_size)
            .field("date", &self.date.character_size)
            .finish()
    }
}

impl FaceFonts {
    pub fn for_shape(shape: ScreenShape) -> Self {
        Self {
            // round panels get the larger digits
            time: match shape {
                ScreenShape::Round => &PROFONT_24_POINT,
                ScreenShape::Rectangular => &PROFONT_18_POINT,
            },
            date: &ascii::FONT_8X13,
            high_temp: &iso_8859_1::FONT_9X18_BOLD,
            low_temp: &iso_8859_1::FONT_9X18,
        }
    }
}

/// Resolved geometry for one screen
#[derive(Debug, Clone)]
pub struct FaceLayout {
    pub width: u32,
    pub height: u32,
    pub shape: ScreenShape,
    pub x_offset: i32,
    pub y_offset: i32,
    pub fonts: FaceFonts,
}

impl FaceLayout {
    pub fn new(width: u32, height: u32, shape: ScreenShape, dims: &FaceDimensions) -> Self {
        let (x_offset, y_offset) = match shape {
            ScreenShape::Round => (dims.x_offset_round, dims.y_offset_round),
            ScreenShape::Rectangular => (dims.x_offset, dims.y_offset),
        };
        Self {
            width,
            height,
            shape,
            x_offset,
            y_offset,
            fonts: FaceFonts::for_shape(shape),
        }
    }

    /// Same insets, new bounds
    pub fn with_bounds(&self, width: u32, height: u32) -> Self {
        Self { width, height, ..self.clone() }
    }

    pub fn center_x(&self) -> i32 {
        self.width as i32 / 2
    }

    /// Left edge for a centred row; rows wider than the screen start at
    /// the shape's x offset instead.
    pub fn row_start(&self, content_width: i32) -> i32 {
        if content_width > self.width as i32 {
            self.x_offset
        } else {
            center_start(self.width, content_width)
        }
    }
}

/// `(canvas - content) / 2`
pub fn center_start(canvas_width: u32, content_width: i32) -> i32 {
    (canvas_width as i32 - content_width) / 2
}

/// Advance width of `text` in `font`
pub fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
    let style = MonoTextStyle::new(font, Rgb888::WHITE);
    style
        .measure_string(text, Point::zero(), Baseline::Alphabetic)
        .next_position
        .x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_start() {
        for (w, total) in [(320u32, 100i32), (320, 320), (321, 100), (280, 0)] {
            assert_eq!(center_start(w, total), (w as i32 - total) / 2);
        }
        assert_eq!(center_start(320, 100), 110);
    }

    #[test]
    fn test_row_start_clamps_wide_rows() {
        let layout = FaceLayout::new(100, 100, ScreenShape::Round, &FaceDimensions::default());
        assert_eq!(layout.row_start(40), 30);
        assert_eq!(layout.row_start(140), 25);
    }

    #[test]
    fn test_shape_picks_offsets_and_fonts() {
        let dims = FaceDimensions::default();
        let rect = FaceLayout::new(320, 320, ScreenShape::Rectangular, &dims);
        let round = FaceLayout::new(320, 320, ScreenShape::Round, &dims);
        assert_eq!((rect.x_offset, rect.y_offset), (15, 90));
        assert_eq!((round.x_offset, round.y_offset), (25, 100));
        assert!(text_width(round.fonts.time, "00") > text_width(rect.fonts.time, "00"));
    }

    #[test]
    fn test_text_width_is_monospaced() {
        let w1 = text_width(&ascii::FONT_8X13, "A");
        assert_eq!(w1, 8);
        assert_eq!(text_width(&ascii::FONT_8X13, "ABCD"), 4 * w1);
        assert_eq!(text_width(&ascii::FONT_8X13, ""), 0);
    }
}
