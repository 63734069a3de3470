/*
 *  display/color.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Theme colours and the per-frame paint set
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex(value: &str) -> Option<Rgb888> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let n = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgb888::new((n >> 16) as u8, (n >> 8) as u8, n as u8))
}

/// Threshold a colour to black or white, the way a low-bit panel shows it
pub fn to_low_bit(color: Rgb888) -> Rgb888 {
    let luminance = 0.299 * color.r() as f32 + 0.587 * color.g() as f32 + 0.114 * color.b() as f32;
    if luminance >= 128.0 { Rgb888::WHITE } else { Rgb888::BLACK }
}

/// Themed colours of the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Interactive background
    pub background: Rgb888,

    /// Time digits and the high temperature
    pub digital_text: Rgb888,

    /// Date, divider and the low temperature
    pub primary_light: Rgb888,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb888::new(0x03, 0xA9, 0xF4),
            digital_text: Rgb888::WHITE,
            primary_light: Rgb888::new(0xB3, 0xE5, 0xFC),
        }
    }
}

/// Colours for a single paint pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paints {
    pub background: Rgb888,
    pub hours: Rgb888,
    pub colon: Rgb888,
    pub minutes: Rgb888,
    pub date: Rgb888,
    pub divider: Rgb888,
    pub high_temp: Rgb888,
    pub low_temp: Rgb888,
    pub anti_alias: bool,
}

impl Paints {
    /// Ambient frames get a black background; without anti-aliasing every
    /// foreground colour collapses to black or white.
    pub fn for_frame(theme: &Theme, ambient: bool, anti_alias: bool) -> Self {
        let fg = |c: Rgb888| if anti_alias { c } else { to_low_bit(c) };
        Self {
            background: if ambient { Rgb888::BLACK } else { theme.background },
            hours: fg(theme.digital_text),
            colon: fg(theme.digital_text),
            minutes: fg(theme.digital_text),
            date: fg(theme.primary_light),
            divider: fg(theme.primary_light),
            high_temp: fg(theme.digital_text),
            low_temp: fg(theme.primary_light),
            anti_alias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#03A9F4"), Some(Rgb888::new(3, 169, 244)));
        assert_eq!(parse_hex("ffffff"), Some(Rgb888::WHITE));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#GG0000"), None);
    }

    #[test]
    fn test_ambient_background_is_black() {
        let theme = Theme::default();
        assert_eq!(Paints::for_frame(&theme, false, true).background, theme.background);
        assert_eq!(Paints::for_frame(&theme, true, true).background, Rgb888::BLACK);
    }

    #[test]
    fn test_low_bit_paints_are_binary() {
        let p = Paints::for_frame(&Theme::default(), true, false);
        assert!(!p.anti_alias);
        assert_eq!(p.date, Rgb888::WHITE);
        assert_eq!(to_low_bit(Rgb888::new(20, 20, 20)), Rgb888::BLACK);
    }
}
