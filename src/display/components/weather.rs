/*
 *  display/components/weather.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather block: condition icon plus high and low temperatures
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::{debug, warn};

use crate::constants::{
    WEATHER_ICON_GAP, WEATHER_ICON_RAISE, WEATHER_ICON_SIZE, WEATHER_LINE_GAP, WEATHER_TEMP_GAP,
};
use crate::display::color::{to_low_bit, Paints};
use crate::display::layout::{text_width, FaceLayout};
use crate::svgimage::{RgbaImage, SvgImageError, SvgImageRenderer};
use crate::weather::{WeatherArt, WeatherSnapshot};
use crate::weather_glyph::weather_svg;

/// What the weather block drew, and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherFrame {
    pub art: WeatherArt,
    /// Condition id used for the lookup (never negative)
    pub condition_id: i32,
    pub high_temp: String,
    pub low_temp: String,
    /// Left edge of the whole group
    pub group_x: i32,
    pub group_width: i32,
    pub icon_origin: Point,
    pub high_x: i32,
    pub low_x: i32,
    /// Temperature baseline
    pub baseline_y: i32,
    /// False when the icon failed to rasterise
    pub icon_drawn: bool,
}

#[derive(Debug)]
struct CachedIcon {
    art: WeatherArt,
    anti_alias: bool,
    image: RgbaImage,
}

/// Weather display component
///
/// Keeps the last rasterised icon; it is rebuilt only when the art or the
/// anti-alias mode changes.
#[derive(Debug, Default)]
pub struct WeatherDisplay {
    icon: Option<CachedIcon>,
    rasterised: u64,
}

impl WeatherDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times an icon was rasterised
    pub fn rasterised(&self) -> u64 {
        self.rasterised
    }

    fn icon(&mut self, art: WeatherArt, anti_alias: bool) -> Result<&RgbaImage, SvgImageError> {
        let stale = !matches!(&self.icon, Some(c) if c.art == art && c.anti_alias == anti_alias);
        if stale {
            let image = SvgImageRenderer::new(weather_svg(art), WEATHER_ICON_SIZE, WEATHER_ICON_SIZE, anti_alias)?
                .render_rgba()?;
            self.rasterised += 1;
            debug!("weather icon {} rasterised (aa={})", art, anti_alias);
            self.icon = Some(CachedIcon { art, anti_alias, image });
        }
        match &self.icon {
            Some(c) => Ok(&c.image),
            None => Err(SvgImageError::EmptyImage),
        }
    }

    /// Draw icon, high and low left to right, centred as one group, with
    /// the temperature baseline `WEATHER_LINE_GAP` below the divider.
    pub fn render<D>(
        &mut self,
        target: &mut D,
        layout: &FaceLayout,
        paints: &Paints,
        snapshot: &WeatherSnapshot,
        divider_y: i32,
    ) -> Result<WeatherFrame, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let condition_id = snapshot.effective_condition_id();
        let art = WeatherArt::for_condition(condition_id);

        let icon_size = WEATHER_ICON_SIZE as i32;
        let high_w = text_width(layout.fonts.high_temp, &snapshot.high_temp);
        let low_w = text_width(layout.fonts.low_temp, &snapshot.low_temp);
        // measured with the gaps actually drawn, not the wider 15/10 pair
        // that would leave the group 5 px left of centre
        let group_width = icon_size + WEATHER_ICON_GAP + high_w + WEATHER_TEMP_GAP + low_w;

        let baseline_y = divider_y + WEATHER_LINE_GAP;
        let group_x = layout.row_start(group_width);
        let icon_origin = Point::new(group_x, baseline_y - WEATHER_ICON_RAISE);

        let background = paints.background;
        let anti_alias = paints.anti_alias;
        let icon_drawn = match self.icon(art, anti_alias) {
            Ok(image) => {
                draw_icon(target, image, icon_origin, background, anti_alias)?;
                true
            }
            Err(e) => {
                warn!("weather icon {} unavailable: {}", art, e);
                false
            }
        };

        let high_x = group_x + icon_size + WEATHER_ICON_GAP;
        Text::with_baseline(
            &snapshot.high_temp,
            Point::new(high_x, baseline_y),
            MonoTextStyle::new(layout.fonts.high_temp, paints.high_temp),
            Baseline::Alphabetic,
        )
        .draw(target)?;

        let low_x = high_x + high_w + WEATHER_TEMP_GAP;
        Text::with_baseline(
            &snapshot.low_temp,
            Point::new(low_x, baseline_y),
            MonoTextStyle::new(layout.fonts.low_temp, paints.low_temp),
            Baseline::Alphabetic,
        )
        .draw(target)?;

        Ok(WeatherFrame {
            art,
            condition_id,
            high_temp: snapshot.high_temp.clone(),
            low_temp: snapshot.low_temp.clone(),
            group_x,
            group_width,
            icon_origin,
            high_x,
            low_x,
            baseline_y,
            icon_drawn,
        })
    }
}

fn blend(bg: Rgb888, fg: [u8; 4]) -> Rgb888 {
    let a = fg[3] as u32;
    let mix = |b: u8, f: u8| ((f as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8;
    Rgb888::new(mix(bg.r(), fg[0]), mix(bg.g(), fg[1]), mix(bg.b(), fg[2]))
}

/// Composite straight-alpha pixels over a known background colour
fn draw_icon<D>(target: &mut D, image: &RgbaImage, origin: Point, background: Rgb888, anti_alias: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let (width, height) = (image.width, image.height);
    let coords = (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)));
    let pixels = coords.filter_map(|(x, y)| {
        let px = image.pixel(x, y)?;
        let p = origin + Point::new(x as i32, y as i32);
        if anti_alias {
            (px[3] > 0).then(|| Pixel(p, blend(background, px)))
        } else {
            (px[3] >= 128).then(|| Pixel(p, to_low_bit(Rgb888::new(px[0], px[1], px[2]))))
        }
    });
    target.draw_iter(pixels)
}
