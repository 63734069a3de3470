/*
 *  bus.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Typed in-process broadcast between the listener and the face
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

use chrono::FixedOffset;
use log::debug;
use tokio::sync::broadcast;

use crate::constants::{ACTION_TIMEZONE_CHANGED, ACTION_WEATHER_CHANGED, BROADCAST_CAPACITY};
use crate::weather::WeatherUpdate;

/// System time-zone change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneChanged {
    pub offset: FixedOffset,
}

/// Fire-and-forget local broadcast with one typed channel per action.
///
/// Senders never wait and never learn whether anyone was listening;
/// a message sent while nobody is registered is simply dropped.
#[derive(Debug, Clone)]
pub struct LocalBroadcast {
    weather: broadcast::Sender<WeatherUpdate>,
    time_zone: broadcast::Sender<TimeZoneChanged>,
}

impl Default for LocalBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBroadcast {
    pub fn new() -> Self {
        let (weather, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (time_zone, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { weather, time_zone }
    }

    /// Returns how many receivers got the update.
    pub fn send_weather(&self, update: WeatherUpdate) -> usize {
        match self.weather.send(update) {
            Ok(n) => {
                debug!("{ACTION_WEATHER_CHANGED} delivered to {n} receiver(s)");
                n
            }
            Err(_) => {
                debug!("{ACTION_WEATHER_CHANGED} dropped, no receivers registered");
                0
            }
        }
    }

    pub fn send_time_zone(&self, change: TimeZoneChanged) -> usize {
        match self.time_zone.send(change) {
            Ok(n) => n,
            Err(_) => {
                debug!("{ACTION_TIMEZONE_CHANGED} dropped, no receivers registered");
                0
            }
        }
    }

    pub fn subscribe_weather(&self) -> broadcast::Receiver<WeatherUpdate> {
        self.weather.subscribe()
    }

    pub fn subscribe_time_zone(&self) -> broadcast::Receiver<TimeZoneChanged> {
        self.time_zone.subscribe()
    }

    pub fn weather_receiver_count(&self) -> usize {
        self.weather.receiver_count()
    }

    pub fn time_zone_receiver_count(&self) -> usize {
        self.time_zone.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_receivers_is_dropped() {
        let bus = LocalBroadcast::new();
        assert_eq!(bus.send_weather(WeatherUpdate::new(None, None, None)), 0);
        assert_eq!(bus.weather_receiver_count(), 0);
    }

    #[test]
    fn test_registered_receiver_gets_update() {
        let bus = LocalBroadcast::new();
        let mut rx = bus.subscribe_weather();
        let update = WeatherUpdate::new(Some("75°".into()), Some("52°".into()), Some(800));
        assert_eq!(bus.send_weather(update.clone()), 1);
        assert_eq!(rx.try_recv().unwrap(), update);
    }

    #[test]
    fn test_receiver_count_tracks_drop() {
        let bus = LocalBroadcast::new();
        let rx = bus.subscribe_time_zone();
        assert_eq!(bus.time_zone_receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.time_zone_receiver_count(), 0);
    }
}
