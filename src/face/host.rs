/*
 *  face/host.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host event loop - platform events, redraw timer and broadcasts
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

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::bus::{LocalBroadcast, TimeZoneChanged};
use crate::clock::Clock;
use crate::constants::AMBIENT_TICK_MS;
use crate::display::traits::FaceSurface;
use crate::face::engine::{Broadcast, FaceProperties, WatchFaceEngine, WindowInsets};
use crate::face::timer::delay_to_next_tick;
use crate::face::FaceError;

/// Callbacks the platform delivers to the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged(FaceProperties),
    WindowInsets(WindowInsets),
    TimeTick,
    Destroy,
}

enum Step {
    Event(Option<PlatformEvent>),
    Timer,
    Broadcast(Broadcast),
}

/// Route one platform event; false once the face is destroyed.
pub fn dispatch<C: Clock>(engine: &mut WatchFaceEngine<C>, event: PlatformEvent) -> bool {
    debug!("platform event {:?}", event);
    match event {
        PlatformEvent::VisibilityChanged(visible) => engine.on_visibility_changed(visible),
        PlatformEvent::AmbientModeChanged(ambient) => engine.on_ambient_mode_changed(ambient),
        PlatformEvent::PropertiesChanged(properties) => engine.on_properties_changed(properties),
        PlatformEvent::WindowInsets(insets) => engine.on_apply_window_insets(insets),
        PlatformEvent::TimeTick => engine.on_time_tick(),
        PlatformEvent::Destroy => {
            engine.on_destroy();
            return false;
        }
    }
    true
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Paint and flush if a redraw was requested while visible.
fn paint<C, D>(engine: &mut WatchFaceEngine<C>, display: &mut D) -> bool
where
    C: Clock,
    D: FaceSurface,
    D::Error: std::fmt::Debug,
{
    if !engine.is_visible() || !engine.is_invalidated() {
        return false;
    }
    match engine.on_draw(display) {
        Ok(state) => {
            debug!(
                "painted {}:{} {} weather={:?}",
                state.clock.hours,
                state.clock.minutes,
                state.clock.date,
                state.weather.as_ref().map(|w| w.art)
            );
        }
        Err(e) => {
            // nothing sensible to retry until the next invalidation
            engine.take_invalidated();
            warn!("Paint failed: {:?}", e);
            return false;
        }
    }
    if let Err(e) = display.flush() {
        warn!("Display flush failed: {}", e);
        return false;
    }
    true
}

/// Single-threaded face loop.
///
/// Runs until `Destroy` arrives or the event channel closes; returns the
/// number of frames pushed to the display.
pub async fn run<C, D>(
    mut engine: WatchFaceEngine<C>,
    mut display: D,
    mut events: mpsc::Receiver<PlatformEvent>,
) -> Result<u64, FaceError>
where
    C: Clock,
    D: FaceSurface,
    D::Error: std::fmt::Debug,
{
    display.init()?;
    let (width, height) = display.dimensions();
    info!("Face host loop started on a {}x{} display", width, height);
    let mut flushed = 0u64;

    loop {
        let deadline = engine.timer().deadline();
        // platform callbacks first, like the platform's own dispatch queue
        let step = tokio::select! {
            biased;
            event = events.recv() => Step::Event(event),
            _ = sleep_until_deadline(deadline) => Step::Timer,
            msg = engine.next_broadcast() => Step::Broadcast(msg),
        };

        match step {
            Step::Event(None) => {
                info!("Platform event channel closed");
                engine.on_destroy();
                break;
            }
            Step::Event(Some(event)) => {
                if !dispatch(&mut engine, event) {
                    break;
                }
            }
            Step::Timer => engine.handle_update_time_message(),
            Step::Broadcast(msg) => engine.apply_broadcast(msg),
        }

        if paint(&mut engine, &mut display) {
            flushed += 1;
        }
    }

    info!("Face host loop finished, {} frame(s) flushed", flushed);
    Ok(flushed)
}

/// Deliver `TimeTick` on every whole minute until the receiver goes away.
pub fn spawn_time_ticker(events: mpsc::Sender<PlatformEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now_ms = Utc::now().timestamp_millis().max(0) as u64;
            let delay = delay_to_next_tick(now_ms, AMBIENT_TICK_MS);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if events.send(PlatformEvent::TimeTick).await.is_err() {
                debug!("time ticker stopping, face is gone");
                break;
            }
        }
    })
}

/// Poll the clock's offset and broadcast a `TimeZoneChanged` only when it
/// differs from the last one seen.
pub fn spawn_time_zone_watch<C>(bus: LocalBroadcast, clock: C, period: Duration) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    let mut last = clock.local_offset();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let offset = clock.local_offset();
            if offset != last {
                info!("System time zone changed: {} -> {}", last, offset);
                last = offset;
                bus.send_time_zone(TimeZoneChanged { offset });
            }
        }
    })
}
