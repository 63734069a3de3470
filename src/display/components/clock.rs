/*
 *  display/components/clock.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time, date and divider block of the face
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

use chrono::{DateTime, FixedOffset};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};

use crate::clock::{format_date, time_strings};
use crate::constants::{DATE_LINE_GAP, DIVIDER_GAP, DIVIDER_HALF_WIDTH, HOUR_BOLD_OFFSET};
use crate::display::color::Paints;
use crate::display::layout::{text_width, FaceLayout};

/// What the clock block drew, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFrame {
    pub hours: String,
    pub minutes: String,
    pub date: String,
    /// Left edge of the time row
    pub time_x: i32,
    /// Left edge of the date row
    pub date_x: i32,
    /// Baseline of the time row
    pub time_y: i32,
    /// Y of the divider line; the weather block hangs off this
    pub divider_y: i32,
}

/// Clock display component
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockDisplay;

impl ClockDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Draw `HH:MM`, the date and the divider, each centred on the screen
    pub fn render<D>(
        &self,
        target: &mut D,
        layout: &FaceLayout,
        paints: &Paints,
        time: &DateTime<FixedOffset>,
    ) -> Result<ClockFrame, D::Error>
    where
        D: DrawTarget<Color = embedded_graphics::pixelcolor::Rgb888>,
    {
        let (hours, minutes) = time_strings(time);
        let colon = ":";
        let font = layout.fonts.time;

        // hours are bold: the double strike widens them by the offset
        let hours_w = text_width(font, &hours) + HOUR_BOLD_OFFSET;
        let colon_w = text_width(font, colon);
        let minutes_w = text_width(font, &minutes);

        let mut y = layout.y_offset;
        let time_x = layout.row_start(hours_w + colon_w + minutes_w);
        let mut x = time_x;

        let hours_style = MonoTextStyle::new(font, paints.hours);
        for dx in [0, HOUR_BOLD_OFFSET] {
            Text::with_baseline(&hours, Point::new(x + dx, y), hours_style, Baseline::Alphabetic).draw(target)?;
        }
        x += hours_w;
        Text::with_baseline(colon, Point::new(x, y), MonoTextStyle::new(font, paints.colon), Baseline::Alphabetic)
            .draw(target)?;
        x += colon_w;
        Text::with_baseline(&minutes, Point::new(x, y), MonoTextStyle::new(font, paints.minutes), Baseline::Alphabetic)
            .draw(target)?;

        let time_y = y;
        y += DATE_LINE_GAP;

        let date = format_date(time);
        let date_x = layout.row_start(text_width(layout.fonts.date, &date));
        Text::with_baseline(&date, Point::new(date_x, y), MonoTextStyle::new(layout.fonts.date, paints.date), Baseline::Alphabetic)
            .draw(target)?;

        y += DIVIDER_GAP;

        let cx = layout.center_x();
        Line::new(Point::new(cx - DIVIDER_HALF_WIDTH, y), Point::new(cx + DIVIDER_HALF_WIDTH, y))
            .into_styled(PrimitiveStyle::with_stroke(paints.divider, 1))
            .draw(target)?;

        Ok(ClockFrame {
            hours,
            minutes,
            date,
            time_x,
            date_x,
            time_y,
            divider_y: y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::Theme;
    use crate::display::layout::FaceDimensions;
    use crate::display::traits::ScreenShape;
    use crate::vframebuf::VarFrameBuf;
    use chrono::TimeZone;
    use embedded_graphics::pixelcolor::Rgb888;

    #[test]
    fn test_clock_block_is_centred() {
        let layout = FaceLayout::new(320, 320, ScreenShape::Round, &FaceDimensions::default());
        let theme = Theme::default();
        let paints = Paints::for_frame(&theme, false, true);
        let mut fb = VarFrameBuf::new(320, 320, theme.background);
        let t = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 10, 19, 9, 5, 0).unwrap();

        let frame = ClockDisplay::new().render(&mut fb, &layout, &paints, &t).unwrap();
        assert_eq!(frame.hours, "09");
        assert_eq!(frame.minutes, "05");
        assert_eq!(frame.date, "MON, OCT 19 2026");

        let time_w = text_width(layout.fonts.time, "09:05") + HOUR_BOLD_OFFSET;
        assert_eq!(frame.time_x, (320 - time_w) / 2);
        let date_w = text_width(layout.fonts.date, &frame.date);
        assert_eq!(frame.date_x, (320 - date_w) / 2);
        assert_eq!(frame.divider_y, layout.y_offset + DATE_LINE_GAP + DIVIDER_GAP);

        // divider spans centre +/- 40
        assert_eq!(fb.pixel(Point::new(160 - 40, frame.divider_y)), Some(paints.divider));
        assert_eq!(fb.pixel(Point::new(160 + 40, frame.divider_y)), Some(paints.divider));
        assert_eq!(fb.pixel(Point::new(160 + 41, frame.divider_y)), Some(theme.background));

        // some digit pixels landed on the time row
        let digits = (frame.time_x..frame.time_x + time_w)
            .flat_map(|x| (layout.y_offset - 20..layout.y_offset).map(move |y| Point::new(x, y)))
            .filter(|p| fb.pixel(*p) == Some(Rgb888::WHITE))
            .count();
        assert!(digits > 0);
    }

    fn lit(fb: &VarFrameBuf<Rgb888>, x0: i32, x1: i32, y0: i32, y1: i32, colour: Rgb888) -> usize {
        (x0..x1)
            .flat_map(|x| (y0..y1).map(move |y| Point::new(x, y)))
            .filter(|p| fb.pixel(*p) == Some(colour))
            .count()
    }

    #[test]
    fn test_hours_are_bolder_than_minutes() {
        let layout = FaceLayout::new(320, 320, ScreenShape::Rectangular, &FaceDimensions::default());
        let theme = Theme::default();
        let paints = Paints::for_frame(&theme, false, true);
        let t = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 10, 19, 9, 9, 0).unwrap();
        let font = layout.fonts.time;
        let y = layout.y_offset;
        let top = y - font.character_size.height as i32;

        let mut fb = VarFrameBuf::new(320, 320, theme.background);
        let frame = ClockDisplay::new().render(&mut fb, &layout, &paints, &t).unwrap();

        // a single plain strike of the same digits
        let mut plain = VarFrameBuf::new(320, 320, theme.background);
        Text::with_baseline("09", Point::new(0, y), MonoTextStyle::new(font, paints.hours), Baseline::Alphabetic)
            .draw(&mut plain)
            .unwrap();

        let hours_w = text_width(font, "09") + HOUR_BOLD_OFFSET;
        let bold = lit(&fb, frame.time_x, frame.time_x + hours_w, top, y + 4, paints.hours);
        let single = lit(&plain, 0, hours_w, top, y + 4, paints.hours);
        assert!(single > 0);
        assert!(bold > single, "bold {bold} vs plain {single}");
    }
}
