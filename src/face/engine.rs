/*
 *  face/engine.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watch face engine - lifecycle, receivers, timer and paint pass
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
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::bus::{LocalBroadcast, TimeZoneChanged};
use crate::clock::Clock;
use crate::constants::{ACTION_TIMEZONE_CHANGED, ACTION_WEATHER_CHANGED, INTERACTIVE_UPDATE_RATE_MS};
use crate::display::color::{Paints, Theme};
use crate::display::components::{ClockDisplay, ClockFrame, WeatherDisplay, WeatherFrame};
use crate::display::layout::{FaceDimensions, FaceLayout};
use crate::display::traits::ScreenShape;
use crate::face::timer::UpdateTimer;
use crate::weather::{WeatherSnapshot, WeatherUpdate};

/// Static settings the engine starts from
#[derive(Debug, Clone)]
pub struct FaceOptions {
    pub width: u32,
    pub height: u32,
    pub shape: ScreenShape,
    pub theme: Theme,
    pub dimensions: FaceDimensions,
    pub interactive_update_ms: u64,
}

impl Default for FaceOptions {
    fn default() -> Self {
        Self {
            width: 320,
            height: 320,
            shape: ScreenShape::Rectangular,
            theme: Theme::default(),
            dimensions: FaceDimensions::default(),
            interactive_update_ms: INTERACTIVE_UPDATE_RATE_MS,
        }
    }
}

/// Device properties reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceProperties {
    pub low_bit_ambient: bool,
}

/// Screen insets; only the outline matters to the face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowInsets {
    pub is_round: bool,
}

impl WindowInsets {
    pub fn shape(&self) -> ScreenShape {
        if self.is_round { ScreenShape::Round } else { ScreenShape::Rectangular }
    }
}

/// A message taken off one of the engine's receivers
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast {
    Weather(WeatherUpdate),
    TimeZone(TimeZoneChanged),
    Lagged { action: &'static str, skipped: u64 },
    Closed { action: &'static str },
}

/// What a paint pass produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub local_time: DateTime<FixedOffset>,
    pub clock: ClockFrame,
    pub weather: Option<WeatherFrame>,
    pub ambient: bool,
    pub anti_alias: bool,
    pub low_bit_ambient: bool,
    pub shape: ScreenShape,
    pub width: u32,
    pub height: u32,
}

pub struct WatchFaceEngine<C: Clock> {
    clock: C,
    bus: LocalBroadcast,
    theme: Theme,
    dimensions: FaceDimensions,
    layout: FaceLayout,

    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    anti_alias: bool,
    offset: FixedOffset,

    weather: Option<WeatherSnapshot>,
    weather_rx: Option<broadcast::Receiver<WeatherUpdate>>,
    time_zone_rx: Option<broadcast::Receiver<TimeZoneChanged>>,

    timer: UpdateTimer,
    invalidated: bool,
    frames: u64,

    clock_display: ClockDisplay,
    weather_display: WeatherDisplay,
}

impl<C: Clock> WatchFaceEngine<C> {
    pub fn new(clock: C, bus: LocalBroadcast, options: FaceOptions) -> Self {
        let offset = clock.local_offset();
        let layout = FaceLayout::new(options.width, options.height, options.shape, &options.dimensions);
        info!(
            "Watch face created: {}x{} {:?}, update every {}ms",
            options.width, options.height, options.shape, options.interactive_update_ms
        );
        Self {
            clock,
            bus,
            theme: options.theme,
            dimensions: options.dimensions,
            layout,
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            anti_alias: true,
            offset,
            weather: None,
            weather_rx: None,
            time_zone_rx: None,
            timer: UpdateTimer::new(options.interactive_update_ms),
            invalidated: true,
            frames: 0,
            clock_display: ClockDisplay::new(),
            weather_display: WeatherDisplay::new(),
        }
    }

    // --- state accessors -------------------------------------------------

    pub fn is_visible(&self) -> bool { self.visible }
    pub fn is_ambient(&self) -> bool { self.ambient }
    pub fn is_anti_alias(&self) -> bool { self.anti_alias }
    pub fn shape(&self) -> ScreenShape { self.layout.shape }
    pub fn layout(&self) -> &FaceLayout { &self.layout }
    pub fn time_zone_offset(&self) -> FixedOffset { self.offset }
    pub fn weather(&self) -> Option<&WeatherSnapshot> { self.weather.as_ref() }
    pub fn timer(&self) -> &UpdateTimer { &self.timer }
    pub fn frames(&self) -> u64 { self.frames }
    pub fn bus(&self) -> &LocalBroadcast { &self.bus }

    pub fn is_weather_registered(&self) -> bool {
        self.weather_rx.is_some()
    }

    // --- invalidation ----------------------------------------------------

    /// Request a redraw
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn take_invalidated(&mut self) -> bool {
        std::mem::replace(&mut self.invalidated, false)
    }

    // --- lifecycle -------------------------------------------------------

    pub fn on_properties_changed(&mut self, properties: FaceProperties) {
        info!("Face properties: low_bit_ambient={}", properties.low_bit_ambient);
        self.low_bit_ambient = properties.low_bit_ambient;
        if self.ambient {
            self.anti_alias = !self.low_bit_ambient;
            self.invalidate();
        }
    }

    /// Round screens get their own offsets and larger digits.
    pub fn on_apply_window_insets(&mut self, insets: WindowInsets) {
        let shape = insets.shape();
        if shape != self.layout.shape {
            info!("Screen shape is {:?}", shape);
        }
        self.layout = FaceLayout::new(self.layout.width, self.layout.height, shape, &self.dimensions);
        self.invalidate();
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.register_receivers();
            // the zone may have changed while hidden
            self.offset = self.clock.local_offset();
            self.invalidate();
        } else {
            self.unregister_receivers();
        }
        info!("Face {}", if visible { "visible" } else { "hidden" });
        self.update_timer();
    }

    pub fn on_ambient_mode_changed(&mut self, in_ambient: bool) {
        if self.ambient != in_ambient {
            self.ambient = in_ambient;
            if self.low_bit_ambient {
                self.anti_alias = !in_ambient;
            }
            info!("Ambient mode {}", if in_ambient { "on" } else { "off" });
            self.invalidate();
        }
        self.update_timer();
    }

    /// Platform tick (once a minute), the only redraw source in ambient.
    pub fn on_time_tick(&mut self) {
        debug!("time tick");
        self.invalidate();
    }

    pub fn on_destroy(&mut self) {
        self.timer.cancel();
        self.unregister_receivers();
        self.visible = false;
        info!("Watch face destroyed after {} frame(s)", self.frames);
    }

    // --- timer -----------------------------------------------------------

    pub fn should_timer_be_running(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Drop any pending tick, then fire one immediately if the face should
    /// be ticking.
    pub fn update_timer(&mut self) {
        self.timer.cancel();
        if self.should_timer_be_running() {
            self.timer.schedule_now();
        }
        debug!("update timer running: {}", self.timer.is_scheduled());
    }

    /// Timer fired: redraw and re-arm on the next interval boundary.
    pub fn handle_update_time_message(&mut self) {
        self.timer.cancel();
        self.invalidate();
        if self.should_timer_be_running() {
            let delay = self.timer.schedule_aligned(self.clock.now_millis());
            debug!("next tick in {}ms", delay);
        }
    }

    // --- receivers -------------------------------------------------------

    fn register_receivers(&mut self) {
        if self.time_zone_rx.is_none() {
            self.time_zone_rx = Some(self.bus.subscribe_time_zone());
            debug!("{} receiver registered", ACTION_TIMEZONE_CHANGED);
        }
        if self.weather_rx.is_none() {
            self.weather_rx = Some(self.bus.subscribe_weather());
            debug!("{} receiver registered", ACTION_WEATHER_CHANGED);
        }
    }

    fn unregister_receivers(&mut self) {
        if self.time_zone_rx.take().is_some() {
            debug!("{} receiver unregistered", ACTION_TIMEZONE_CHANGED);
        }
        if self.weather_rx.take().is_some() {
            debug!("{} receiver unregistered", ACTION_WEATHER_CHANGED);
        }
    }

    /// Wait for the next message on any registered receiver; pends forever
    /// while none is registered.
    pub async fn next_broadcast(&mut self) -> Broadcast {
        tokio::select! {
            r = recv_registered(&mut self.weather_rx) => match r {
                Ok(update) => Broadcast::Weather(update),
                Err(e) => recv_failure(ACTION_WEATHER_CHANGED, e),
            },
            r = recv_registered(&mut self.time_zone_rx) => match r {
                Ok(change) => Broadcast::TimeZone(change),
                Err(e) => recv_failure(ACTION_TIMEZONE_CHANGED, e),
            },
        }
    }

    /// Drain whatever is queued without waiting; returns messages applied.
    pub fn pump_broadcasts(&mut self) -> usize {
        let mut applied = 0;
        while let Some(msg) = try_recv_registered(&mut self.time_zone_rx, ACTION_TIMEZONE_CHANGED, Broadcast::TimeZone) {
            self.apply_broadcast(msg);
            applied += 1;
        }
        while let Some(msg) = try_recv_registered(&mut self.weather_rx, ACTION_WEATHER_CHANGED, Broadcast::Weather) {
            self.apply_broadcast(msg);
            applied += 1;
        }
        applied
    }

    pub fn apply_broadcast(&mut self, msg: Broadcast) {
        match msg {
            Broadcast::Weather(update) => self.on_weather_changed(update),
            Broadcast::TimeZone(change) => self.on_time_zone_changed(change),
            Broadcast::Lagged { action, skipped } => {
                warn!("{} receiver lagged, {} message(s) skipped", action, skipped);
            }
            Broadcast::Closed { action } => {
                warn!("{} channel closed, unregistering", action);
                if action == ACTION_WEATHER_CHANGED {
                    self.weather_rx = None;
                } else {
                    self.time_zone_rx = None;
                }
            }
        }
    }

    /// Every update replaces the snapshot; one missing temperature clears it.
    pub fn on_weather_changed(&mut self, update: WeatherUpdate) {
        info!("{} received: {:?}", ACTION_WEATHER_CHANGED, update);
        self.weather = WeatherSnapshot::from_update(update);
        if self.weather.is_none() {
            debug!("incomplete weather update, weather block hidden");
        }
        self.invalidate();
    }

    pub fn on_time_zone_changed(&mut self, change: TimeZoneChanged) {
        info!("{} received: {}", ACTION_TIMEZONE_CHANGED, change.offset);
        self.offset = change.offset;
        self.invalidate();
    }

    // --- paint -----------------------------------------------------------

    pub fn local_time(&self) -> DateTime<FixedOffset> {
        self.clock.now_utc().with_timezone(&self.offset)
    }

    /// Paint one frame into `target`, sized to the target's bounds.
    pub fn on_draw<D>(&mut self, target: &mut D) -> Result<RenderState, D::Error>
    where
        D: DrawTarget<Color = Rgb888> + OriginDimensions,
    {
        let size = target.size();
        if size.width != self.layout.width || size.height != self.layout.height {
            self.layout = self.layout.with_bounds(size.width, size.height);
        }

        let paints = Paints::for_frame(&self.theme, self.ambient, self.anti_alias);
        target.clear(paints.background)?;

        let local_time = self.local_time();
        let clock = self.clock_display.render(target, &self.layout, &paints, &local_time)?;
        let weather = match &self.weather {
            Some(snapshot) => Some(self.weather_display.render(
                target,
                &self.layout,
                &paints,
                snapshot,
                clock.divider_y,
            )?),
            None => None,
        };

        self.invalidated = false;
        self.frames += 1;
        Ok(RenderState {
            local_time,
            clock,
            weather,
            ambient: self.ambient,
            anti_alias: self.anti_alias,
            low_bit_ambient: self.low_bit_ambient,
            shape: self.layout.shape,
            width: size.width,
            height: size.height,
        })
    }
}

async fn recv_registered<T: Clone>(rx: &mut Option<broadcast::Receiver<T>>) -> Result<T, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn recv_failure(action: &'static str, e: RecvError) -> Broadcast {
    match e {
        RecvError::Lagged(skipped) => Broadcast::Lagged { action, skipped },
        RecvError::Closed => Broadcast::Closed { action },
    }
}

fn try_recv_registered<T: Clone>(
    rx: &mut Option<broadcast::Receiver<T>>,
    action: &'static str,
    wrap: fn(T) -> Broadcast,
) -> Option<Broadcast> {
    match rx.as_mut()?.try_recv() {
        Ok(value) => Some(wrap(value)),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Lagged(skipped)) => Some(Broadcast::Lagged { action, skipped }),
        Err(TryRecvError::Closed) => Some(Broadcast::Closed { action }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::vframebuf::VarFrameBuf;
    use crate::weather::WeatherArt;
    use chrono::TimeZone;
    use std::time::Duration;

    fn clock() -> ManualClock {
        let now = chrono::Utc.with_ymd_and_hms(2026, 10, 19, 13, 5, 7).unwrap();
        ManualClock::new(now, FixedOffset::east_opt(3600).unwrap())
    }

    fn engine() -> WatchFaceEngine<ManualClock> {
        WatchFaceEngine::new(clock(), LocalBroadcast::new(), FaceOptions::default())
    }

    fn update(max: Option<&str>, min: Option<&str>, id: Option<i32>) -> WeatherUpdate {
        WeatherUpdate::new(max.map(Into::into), min.map(Into::into), id)
    }

    #[test]
    fn test_visibility_registers_once() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.on_visibility_changed(true);
        assert_eq!(face.bus().weather_receiver_count(), 1);
        assert_eq!(face.bus().time_zone_receiver_count(), 1);

        face.on_visibility_changed(false);
        assert_eq!(face.bus().weather_receiver_count(), 0);
        assert!(!face.timer().is_scheduled());

        face.on_visibility_changed(true);
        assert_eq!(face.bus().weather_receiver_count(), 1);
        assert_eq!(face.bus().time_zone_receiver_count(), 1);
        assert!(face.timer().is_scheduled());
    }

    #[test]
    fn test_ambient_stops_and_restarts_timer() {
        let mut face = engine();
        face.on_properties_changed(FaceProperties { low_bit_ambient: true });
        face.on_visibility_changed(true);
        assert!(face.timer().is_scheduled());

        face.on_ambient_mode_changed(true);
        assert!(!face.timer().is_scheduled());
        assert!(!face.is_anti_alias());

        face.handle_update_time_message();
        assert!(!face.timer().is_scheduled());

        face.on_ambient_mode_changed(false);
        assert!(face.is_anti_alias());
        let deadline = face.timer().deadline().unwrap();
        assert!(deadline <= tokio::time::Instant::now() + Duration::from_millis(1000));
    }

    #[test]
    fn test_tick_realigns_to_second() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.take_invalidated();
        face.handle_update_time_message();
        assert!(face.is_invalidated());
        // clock sits on a whole second, so the next tick is a full interval out
        let deadline = face.timer().deadline().unwrap();
        assert!(deadline > tokio::time::Instant::now() + Duration::from_millis(900));
    }

    #[test]
    fn test_weather_broadcast_reaches_paint() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.bus().send_weather(update(Some("75°"), Some("52°"), Some(800)));
        assert_eq!(face.pump_broadcasts(), 1);

        let mut fb = VarFrameBuf::new(320, 320, Rgb888::BLACK);
        let state = face.on_draw(&mut fb).unwrap();
        let weather = state.weather.unwrap();
        assert_eq!(weather.high_temp, "75°");
        assert_eq!(weather.low_temp, "52°");
        assert_eq!(weather.art, WeatherArt::Clear);
        assert_eq!(state.clock.hours, "14");
        assert_eq!(state.clock.minutes, "05");
        assert!(!face.is_invalidated());
    }

    #[test]
    fn test_unset_id_paints_clear() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.bus().send_weather(update(Some("75°"), Some("52°"), None));
        face.pump_broadcasts();
        let mut fb = VarFrameBuf::new(320, 320, Rgb888::BLACK);
        let weather = face.on_draw(&mut fb).unwrap().weather.unwrap();
        assert_eq!(weather.condition_id, 800);
        assert_eq!(weather.art, WeatherArt::Clear);
    }

    #[test]
    fn test_partial_update_hides_weather() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.bus().send_weather(update(Some("75°"), Some("52°"), Some(500)));
        face.bus().send_weather(update(Some("71°"), None, Some(500)));
        assert_eq!(face.pump_broadcasts(), 2);
        assert!(face.weather().is_none());
        let mut fb = VarFrameBuf::new(320, 320, Rgb888::BLACK);
        assert!(face.on_draw(&mut fb).unwrap().weather.is_none());
    }

    #[test]
    fn test_hidden_face_misses_broadcasts() {
        let mut face = engine();
        assert_eq!(face.bus().send_weather(update(Some("75°"), Some("52°"), Some(800))), 0);
        face.on_visibility_changed(true);
        assert_eq!(face.pump_broadcasts(), 0);
        assert!(face.weather().is_none());
    }

    #[test]
    fn test_time_zone_change() {
        let mut face = engine();
        face.on_visibility_changed(true);
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        face.bus().send_time_zone(TimeZoneChanged { offset });
        face.take_invalidated();
        face.pump_broadcasts();
        assert!(face.is_invalidated());
        assert_eq!(face.time_zone_offset(), offset);
        assert_eq!(face.local_time().format("%H").to_string(), "08");
    }

    #[test]
    fn test_round_insets() {
        let mut face = engine();
        face.on_apply_window_insets(WindowInsets { is_round: true });
        assert_eq!(face.shape(), ScreenShape::Round);
        assert_eq!(face.layout().y_offset, FaceDimensions::default().y_offset_round);
    }

    #[test]
    fn test_destroy_cancels_everything() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.on_destroy();
        assert!(!face.timer().is_scheduled());
        assert!(!face.is_weather_registered());
        assert_eq!(face.bus().time_zone_receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_next_broadcast() {
        let mut face = engine();
        face.on_visibility_changed(true);
        face.bus().send_weather(update(Some("60°"), Some("40°"), Some(201)));
        let msg = face.next_broadcast().await;
        face.apply_broadcast(msg);
        assert_eq!(face.weather().map(|w| w.art()), Some(WeatherArt::Storm));
    }
}
