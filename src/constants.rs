//! This module contains global constants shared by the listener, the broadcast bus and the face.

// Sync record contract
/// Data-layer path the phone publishes weather records under.
pub const WEARABLE_DATA_PATH: &str = "/wearable";
/// Record key for the high temperature (preformatted string, e.g. "75°").
pub const KEY_MAX_TEMP: &str = "max";
/// Record key for the low temperature.
pub const KEY_MIN_TEMP: &str = "min";
/// Record key for the OpenWeatherMap condition id.
pub const KEY_WEATHER_ID: &str = "weather_id";

/// Action name for weather broadcasts, used in traces only.
pub const ACTION_WEATHER_CHANGED: &str = "ACTION_WEATHER_CHANGED";
/// Action name for time-zone broadcasts.
pub const ACTION_TIMEZONE_CHANGED: &str = "ACTION_TIMEZONE_CHANGED";

/// Condition id carried by a broadcast when the record had none.
pub const WEATHER_ID_UNSET: i32 = -1;
/// Condition id used for icon lookup when nothing valid was received ("clear").
pub const DEFAULT_WEATHER_ID: i32 = 800;

/// Capacity of each local broadcast channel.
pub const BROADCAST_CAPACITY: usize = 16;

// Timer
/// Interactive redraw interval in milliseconds (seconds resolution).
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1000;
/// Ambient mode tick, driven by the platform, not the redraw timer.
pub const AMBIENT_TICK_MS: u64 = 60_000;
/// How often the host checks the system offset for a time-zone change.
pub const TIMEZONE_POLL_SECS: u64 = 30;

// Layout
/// Baseline gap between the time line and the date line.
pub const DATE_LINE_GAP: i32 = 27;
/// Gap between the date baseline and the divider.
pub const DIVIDER_GAP: i32 = 15;
/// Second strike of the hours, to the right of the first; profont has no bold
pub const HOUR_BOLD_OFFSET: i32 = 1;
/// Half the width of the centred divider line.
pub const DIVIDER_HALF_WIDTH: i32 = 40;
/// Gap between the divider and the temperature baseline.
pub const WEATHER_LINE_GAP: i32 = 50;
/// The icon top sits this far above the temperature baseline.
pub const WEATHER_ICON_RAISE: i32 = 40;
/// Weather icon edge length after scaling.
pub const WEATHER_ICON_SIZE: u32 = 60;
/// Gap between the icon and the high temperature.
pub const WEATHER_ICON_GAP: i32 = 10;
/// Gap between the high and low temperatures.
pub const WEATHER_TEMP_GAP: i32 = 5;

/// Date pattern, rendered uppercase ("MON, OCT 19 2026").
pub const DATE_FORMAT: &str = "%a, %b %-d %Y";
