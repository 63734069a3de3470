/*
 *  main.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless watch face: relays weather events and writes each frame
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

use anyhow::{Context, Result};
use env_logger::Env;
use log::{info, warn};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use sunshinewear::bus::LocalBroadcast;
use sunshinewear::clock::SystemClock;
use sunshinewear::config::{self, Config};
use sunshinewear::constants::TIMEZONE_POLL_SECS;
use sunshinewear::display::drivers::SnapshotDriver;
use sunshinewear::display::DisplayCapabilities;
use sunshinewear::face::{self, PlatformEvent, WatchFaceEngine};
use sunshinewear::listener::WeatherListener;
use sunshinewear::sync::JsonLinesTransport;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} - weather on the wrist", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    // one logical thread for the face, like the platform's UI thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let result = runtime.block_on(run_face(cfg));
    // an interactive stdin read would otherwise hold shutdown open
    runtime.shutdown_background();
    result
}

async fn run_face(cfg: Config) -> Result<()> {
    let options = cfg.face_options();
    let properties = cfg.face_properties();

    let capabilities = DisplayCapabilities::new(options.width, options.height);
    let snapshot = cfg.snapshot_path();
    info!("Writing frames to {}", snapshot.display());
    let display = SnapshotDriver::new(capabilities, snapshot);

    let bus = LocalBroadcast::new();
    let engine = WatchFaceEngine::new(SystemClock, bus.clone(), options);

    let transport = match cfg.sync_source() {
        Some(path) => JsonLinesTransport::new(Some(path)),
        None => JsonLinesTransport::stdin(),
    };
    let listener = WeatherListener::new(transport, bus.clone())
        .with_path(cfg.sync_path())
        .spawn();

    let (events_tx, events_rx) = mpsc::channel(32);
    let ticker = face::spawn_time_ticker(events_tx.clone());
    let tz_watch = face::spawn_time_zone_watch(
        bus.clone(),
        SystemClock,
        Duration::from_secs(TIMEZONE_POLL_SECS),
    );

    let start_up = [
        PlatformEvent::WindowInsets(cfg.window_insets()),
        PlatformEvent::PropertiesChanged(properties),
        PlatformEvent::VisibilityChanged(true),
    ];
    for event in start_up {
        events_tx.send(event).await.context("queueing start-up events")?;
    }
    let signals = tokio::spawn(forward_signals(events_tx));

    let frames = face::host::run(engine, display, events_rx).await?;

    listener.stop().await;
    ticker.abort();
    tz_watch.abort();
    signals.abort();
    info!("Shut down cleanly after {} frame(s)", frames);
    Ok(())
}

/// Map Unix signals onto platform events.
///
/// SIGINT/SIGTERM destroy the face, SIGUSR1 toggles ambient mode and
/// SIGUSR2 toggles visibility.
async fn forward_signals(events: mpsc::Sender<PlatformEvent>) {
    let streams = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
    );
    let (mut sigint, mut sigterm, mut sigusr1, mut sigusr2) = match streams {
        (Ok(a), Ok(b), Ok(c), Ok(d)) => (a, b, c, d),
        _ => {
            warn!("Unable to install signal handlers");
            return;
        }
    };

    let mut ambient = false;
    let mut visible = true;
    loop {
        let event = tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT received. Initiating graceful shutdown.");
                PlatformEvent::Destroy
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received. Initiating graceful shutdown.");
                PlatformEvent::Destroy
            }
            _ = sigusr1.recv() => {
                ambient = !ambient;
                PlatformEvent::AmbientModeChanged(ambient)
            }
            _ = sigusr2.recv() => {
                visible = !visible;
                PlatformEvent::VisibilityChanged(visible)
            }
        };
        let last = event == PlatformEvent::Destroy;
        if events.send(event).await.is_err() || last {
            break;
        }
    }
}
