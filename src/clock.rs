/*
 *  clock.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall clock source and the time/date formatting used by the face
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

use chrono::{DateTime, FixedOffset, Local, Timelike, Utc};
use std::sync::{Arc, Mutex};

use crate::constants::DATE_FORMAT;

/// Where the face gets the current instant and the system time-zone offset.
///
/// The platform owns both; the face only reads them. Tests drive a
/// [`ManualClock`] instead of the system clock.
pub trait Clock: Send {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Offset of the system default time zone right now.
    fn local_offset(&self) -> FixedOffset;

    /// Milliseconds since the Unix epoch, used for timer alignment.
    fn now_millis(&self) -> u64 {
        self.now_utc().timestamp_millis().max(0) as u64
    }
}

/// System wall clock backed by chrono's `Local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// Clock whose time and offset are set by hand; clones share state.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<(DateTime<Utc>, FixedOffset)>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { inner: Arc::new(Mutex::new((now, offset))) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut g) = self.inner.lock() {
            g.0 = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut g) = self.inner.lock() {
            g.0 += by;
        }
    }

    pub fn set_offset(&self, offset: FixedOffset) {
        if let Ok(mut g) = self.inner.lock() {
            g.1 = offset;
        }
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().map(|g| g.0).unwrap_or_else(|p| p.into_inner().0)
    }

    fn local_offset(&self) -> FixedOffset {
        self.inner.lock().map(|g| g.1).unwrap_or_else(|p| p.into_inner().1)
    }
}

/// Zero padded, always two digits for 0..=99.
pub fn format_two_digit(value: u32) -> String {
    format!("{:02}", value)
}

/// Hour (24h) and minute strings for the time line.
pub fn time_strings(time: &DateTime<FixedOffset>) -> (String, String) {
    (format_two_digit(time.hour()), format_two_digit(time.minute()))
}

/// Uppercased date line, e.g. "MON, OCT 19 2026".
pub fn format_date(time: &DateTime<FixedOffset>) -> String {
    time.format(DATE_FORMAT).to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_two_digit_hours_and_minutes() {
        for h in 0..24 {
            let s = format_two_digit(h);
            assert_eq!(s.len(), 2, "hour {h} -> {s}");
        }
        for m in 0..60 {
            assert_eq!(format_two_digit(m).len(), 2);
        }
        assert_eq!(format_two_digit(5), "05");
        assert_eq!(format_two_digit(23), "23");
        assert_eq!(format_two_digit(0), "00");
    }

    #[test]
    fn test_date_is_uppercased() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let t = tz.with_ymd_and_hms(2026, 10, 19, 7, 4, 0).unwrap();
        assert_eq!(format_date(&t), "MON, OCT 19 2026");
        assert_eq!(time_strings(&t), ("07".to_string(), "04".to_string()));
    }

    #[test]
    fn test_time_strings_follow_offset() {
        let utc = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = utc.with_timezone(&plus_two);
        assert_eq!(time_strings(&local), ("01".to_string(), "30".to_string()));
        assert_eq!(format_date(&local), "TUE, OCT 20 2026");
    }

    #[test]
    fn test_manual_clock_shared_state() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start, FixedOffset::east_opt(0).unwrap());
        let other = clock.clone();
        other.advance(chrono::Duration::milliseconds(1500));
        assert_eq!(clock.now_millis() % 1000, 500);
        other.set_offset(FixedOffset::west_opt(3600).unwrap());
        assert_eq!(clock.local_offset().local_minus_utc(), -3600);
    }
}
