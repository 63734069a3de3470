/*
 *  weather_glyph.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather condition art, one small SVG per icon family
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

use crate::weather::WeatherArt;

// All art shares a 48x48 canvas and is scaled on render.

const CLEAR: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<g stroke="#FFC107" stroke-width="3" stroke-linecap="round">
<line x1="24" y1="3" x2="24" y2="9"/><line x1="24" y1="39" x2="24" y2="45"/>
<line x1="3" y1="24" x2="9" y2="24"/><line x1="39" y1="24" x2="45" y2="24"/>
<line x1="9" y1="9" x2="13" y2="13"/><line x1="35" y1="35" x2="39" y2="39"/>
<line x1="9" y1="39" x2="13" y2="35"/><line x1="35" y1="13" x2="39" y2="9"/>
</g>
<circle cx="24" cy="24" r="10" fill="#FFC107"/>
</svg>"##;

const LIGHT_CLOUDS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<circle cx="30" cy="16" r="9" fill="#FFC107"/>
<path d="M12 38 h22 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -1 13 z" fill="#ECEFF1"/>
</svg>"##;

const CLOUDS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<path d="M20 26 h18 a7 7 0 0 0 0 -14 a10 10 0 0 0 -18 2 z" fill="#B0BEC5"/>
<path d="M10 40 h22 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -1 13 z" fill="#ECEFF1"/>
</svg>"##;

const LIGHT_RAIN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<path d="M10 30 h24 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -3 13 z" fill="#ECEFF1"/>
<g stroke="#4FC3F7" stroke-width="3" stroke-linecap="round">
<line x1="18" y1="35" x2="16" y2="41"/><line x1="28" y1="35" x2="26" y2="41"/>
</g>
</svg>"##;

const RAIN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<path d="M10 28 h24 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -3 13 z" fill="#B0BEC5"/>
<g stroke="#29B6F6" stroke-width="3" stroke-linecap="round">
<line x1="14" y1="33" x2="11" y2="42"/><line x1="22" y1="33" x2="19" y2="42"/>
<line x1="30" y1="33" x2="27" y2="42"/><line x1="38" y1="33" x2="35" y2="42"/>
</g>
</svg>"##;

const SNOW: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<path d="M10 28 h24 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -3 13 z" fill="#ECEFF1"/>
<g fill="#FFFFFF">
<circle cx="14" cy="36" r="2.5"/><circle cx="24" cy="40" r="2.5"/><circle cx="34" cy="36" r="2.5"/>
<circle cx="19" cy="44" r="2"/><circle cx="29" cy="44" r="2"/>
</g>
</svg>"##;

const STORM: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<path d="M10 26 h24 a8 8 0 0 0 0 -16 a11 11 0 0 0 -21 3 a7 7 0 0 0 -3 13 z" fill="#90A4AE"/>
<path d="M24 24 l-7 12 h6 l-3 10 l11 -14 h-6 l4 -8 z" fill="#FFEB3B"/>
</svg>"##;

const FOG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="48" height="48" viewBox="0 0 48 48">
<g stroke="#CFD8DC" stroke-width="4" stroke-linecap="round">
<line x1="8" y1="14" x2="40" y2="14"/><line x1="4" y1="22" x2="36" y2="22"/>
<line x1="12" y1="30" x2="44" y2="30"/><line x1="6" y1="38" x2="38" y2="38"/>
</g>
</svg>"##;

/// SVG source for a weather icon family.
pub fn weather_svg(art: WeatherArt) -> &'static str {
    match art {
        WeatherArt::Storm => STORM,
        WeatherArt::LightRain => LIGHT_RAIN,
        WeatherArt::Rain => RAIN,
        WeatherArt::Snow => SNOW,
        WeatherArt::Fog => FOG,
        WeatherArt::Clear => CLEAR,
        WeatherArt::LightClouds => LIGHT_CLOUDS,
        WeatherArt::Clouds => CLOUDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svgimage::SvgImageRenderer;

    #[test]
    fn test_every_art_renders() {
        let all = [
            WeatherArt::Storm,
            WeatherArt::LightRain,
            WeatherArt::Rain,
            WeatherArt::Snow,
            WeatherArt::Fog,
            WeatherArt::Clear,
            WeatherArt::LightClouds,
            WeatherArt::Clouds,
        ];
        for art in all {
            let img = SvgImageRenderer::new(weather_svg(art), 60, 60, true)
                .and_then(|r| r.render_rgba())
                .unwrap_or_else(|e| panic!("{art}: {e}"));
            assert!(img.pixels.iter().any(|p| p[3] > 0), "{art} rendered empty");
        }
    }
}
