/*
 *  face/timer.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Interactive redraw timer, aligned to whole intervals
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

use std::time::Duration;
use tokio::time::Instant;

/// Delay until the next whole `interval_ms` boundary, in 1..=interval_ms.
#[inline]
pub fn delay_to_next_tick(now_ms: u64, interval_ms: u64) -> u64 {
    let interval = interval_ms.max(1);
    interval - (now_ms % interval)
}

/// The one self-scheduled operation of the face.
///
/// Holds at most one pending deadline; scheduling replaces it, so there is
/// never more than one tick in flight.
#[derive(Debug, Clone)]
pub struct UpdateTimer {
    deadline: Option<Instant>,
    interval_ms: u64,
}

impl UpdateTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self { deadline: None, interval_ms: interval_ms.max(1) }
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn schedule_now(&mut self) {
        self.deadline = Some(Instant::now());
    }

    pub fn schedule_after(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    /// Schedule the tick for the next interval boundary of `now_ms`.
    pub fn schedule_aligned(&mut self, now_ms: u64) -> u64 {
        let delay = delay_to_next_tick(now_ms, self.interval_ms);
        self.schedule_after(Duration::from_millis(delay));
        delay
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_to_next_tick() {
        assert_eq!(delay_to_next_tick(0, 1000), 1000);
        assert_eq!(delay_to_next_tick(1, 1000), 999);
        assert_eq!(delay_to_next_tick(1_700_000_000_999, 1000), 1);
        assert_eq!(delay_to_next_tick(12_345, 1000), 655);
        assert_eq!(delay_to_next_tick(5, 0), 1);
    }

    #[test]
    fn test_schedule_replaces_pending_tick() {
        let mut timer = UpdateTimer::new(1000);
        assert!(!timer.is_scheduled());
        timer.schedule_after(Duration::from_secs(5));
        let first = timer.deadline().unwrap();
        timer.schedule_now();
        assert!(timer.deadline().unwrap() < first);
        timer.cancel();
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn test_schedule_aligned() {
        let mut timer = UpdateTimer::new(1000);
        let before = Instant::now();
        assert_eq!(timer.schedule_aligned(1_250), 750);
        let deadline = timer.deadline().unwrap();
        assert!(deadline >= before + Duration::from_millis(750));
        assert!(deadline <= Instant::now() + Duration::from_millis(750));
    }
}
