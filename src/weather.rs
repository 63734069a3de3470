/*
 *  weather.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather snapshot carried from the phone and condition id to art lookup
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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_WEATHER_ID, WEATHER_ID_UNSET};

/// Payload of a weather broadcast, as decoded from one sync record.
///
/// Fields mirror the record: either temperature may be missing, and a
/// missing condition id arrives as [`WEATHER_ID_UNSET`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherUpdate {
    pub max: Option<String>,
    pub min: Option<String>,
    #[serde(default = "unset_weather_id")]
    pub weather_id: i32,
}

fn unset_weather_id() -> i32 {
    WEATHER_ID_UNSET
}

impl WeatherUpdate {
    pub fn new(max: Option<String>, min: Option<String>, weather_id: Option<i32>) -> Self {
        Self { max, min, weather_id: weather_id.unwrap_or(WEATHER_ID_UNSET) }
    }
}

/// Last weather the face knows about. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSnapshot {
    pub high_temp: String,
    pub low_temp: String,
    pub condition_id: i32,
}

impl WeatherSnapshot {
    /// Both temperatures must be present; a record missing either one
    /// counts as "no weather" and hides the whole block.
    pub fn from_update(update: WeatherUpdate) -> Option<Self> {
        match (update.max, update.min) {
            (Some(high_temp), Some(low_temp)) => Some(Self {
                high_temp,
                low_temp,
                condition_id: update.weather_id,
            }),
            _ => None,
        }
    }

    /// Condition id used for icon lookup; never negative.
    pub fn effective_condition_id(&self) -> i32 {
        if self.condition_id < 0 { DEFAULT_WEATHER_ID } else { self.condition_id }
    }

    pub fn art(&self) -> WeatherArt {
        WeatherArt::for_condition(self.effective_condition_id())
    }
}

/// Icon families, one per art asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherArt {
    Storm,
    LightRain,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Clouds,
}

impl WeatherArt {
    /// OpenWeatherMap condition code to art. See
    /// <http://openweathermap.org/weather-conditions>.
    pub fn lookup(weather_id: i32) -> Option<Self> {
        let art = match weather_id {
            200..=232 => WeatherArt::Storm,
            300..=321 => WeatherArt::LightRain,
            500..=504 => WeatherArt::Rain,
            511 => WeatherArt::Snow,
            520..=531 => WeatherArt::Rain,
            600..=622 => WeatherArt::Snow,
            761 | 781 => WeatherArt::Storm,
            701..=761 => WeatherArt::Fog,
            800 => WeatherArt::Clear,
            801 => WeatherArt::LightClouds,
            802..=804 => WeatherArt::Clouds,
            _ => return None,
        };
        Some(art)
    }

    /// Like [`lookup`](Self::lookup) but unknown codes fall back to clear.
    pub fn for_condition(weather_id: i32) -> Self {
        Self::lookup(weather_id).unwrap_or(WeatherArt::Clear)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeatherArt::Storm => "storm",
            WeatherArt::LightRain => "light_rain",
            WeatherArt::Rain => "rain",
            WeatherArt::Snow => "snow",
            WeatherArt::Fog => "fog",
            WeatherArt::Clear => "clear",
            WeatherArt::LightClouds => "light_clouds",
            WeatherArt::Clouds => "clouds",
        }
    }
}

impl fmt::Display for WeatherArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(max: Option<&str>, min: Option<&str>, id: Option<i32>) -> WeatherUpdate {
        WeatherUpdate::new(max.map(String::from), min.map(String::from), id)
    }

    #[test]
    fn test_full_update_makes_snapshot() {
        let snap = WeatherSnapshot::from_update(update(Some("75°"), Some("52°"), Some(800))).unwrap();
        assert_eq!(snap.high_temp, "75°");
        assert_eq!(snap.low_temp, "52°");
        assert_eq!(snap.art(), WeatherArt::Clear);
    }

    #[test]
    fn test_partial_update_is_no_weather() {
        assert!(WeatherSnapshot::from_update(update(Some("75°"), None, Some(500))).is_none());
        assert!(WeatherSnapshot::from_update(update(None, Some("52°"), Some(500))).is_none());
        assert!(WeatherSnapshot::from_update(update(None, None, None)).is_none());
    }

    #[test]
    fn test_unset_id_resolves_to_default() {
        let snap = WeatherSnapshot::from_update(update(Some("10°"), Some("2°"), None)).unwrap();
        assert_eq!(snap.condition_id, WEATHER_ID_UNSET);
        assert_eq!(snap.effective_condition_id(), DEFAULT_WEATHER_ID);
        assert!(snap.effective_condition_id() >= 0);
    }

    #[test]
    fn test_condition_table() {
        assert_eq!(WeatherArt::lookup(200), Some(WeatherArt::Storm));
        assert_eq!(WeatherArt::lookup(232), Some(WeatherArt::Storm));
        assert_eq!(WeatherArt::lookup(310), Some(WeatherArt::LightRain));
        assert_eq!(WeatherArt::lookup(502), Some(WeatherArt::Rain));
        assert_eq!(WeatherArt::lookup(511), Some(WeatherArt::Snow));
        assert_eq!(WeatherArt::lookup(521), Some(WeatherArt::Rain));
        assert_eq!(WeatherArt::lookup(601), Some(WeatherArt::Snow));
        assert_eq!(WeatherArt::lookup(741), Some(WeatherArt::Fog));
        assert_eq!(WeatherArt::lookup(761), Some(WeatherArt::Storm));
        assert_eq!(WeatherArt::lookup(781), Some(WeatherArt::Storm));
        assert_eq!(WeatherArt::lookup(801), Some(WeatherArt::LightClouds));
        assert_eq!(WeatherArt::lookup(804), Some(WeatherArt::Clouds));
        assert_eq!(WeatherArt::lookup(900), None);
        assert_eq!(WeatherArt::for_condition(900), WeatherArt::Clear);
        assert_eq!(WeatherArt::for_condition(-7), WeatherArt::Clear);
    }
}
