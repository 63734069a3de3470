/*
 *  listener.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Relays weather records from the data layer onto the local broadcast
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

use log::{debug, error, info, log, Level};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bus::LocalBroadcast;
use crate::constants::{KEY_MAX_TEMP, KEY_MIN_TEMP, KEY_WEATHER_ID, WEARABLE_DATA_PATH};
use crate::sync::{DataEvent, DataEventKind, DataMap, SyncTransport};
use crate::weather::WeatherUpdate;

/// Decode the weather fields of a record. Missing fields stay missing.
pub fn decode_weather(data: &DataMap) -> WeatherUpdate {
    WeatherUpdate::new(
        data.get_string(KEY_MAX_TEMP),
        data.get_string(KEY_MIN_TEMP),
        data.get_int(KEY_WEATHER_ID),
    )
}

/// Listens to the data layer and republishes weather records.
///
/// Keeps nothing between events: every matching change is decoded and
/// broadcast on its own, so the newest processed record wins.
pub struct WeatherListener<T: SyncTransport> {
    transport: T,
    bus: LocalBroadcast,
    path: String,
}

/// Level for the n-th consecutive connection failure: warn once, then debug.
pub fn retry_log_level(failures: u32) -> Level {
    if failures <= 1 { Level::Warn } else { Level::Debug }
}

/// Handle on a spawned listener task.
pub struct ListenerHandle {
    stop_sender: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl ListenerHandle {
    /// Stop the listener and wait for the task to finish.
    pub async fn stop(self) {
        // a closed channel means the task already ended
        let _ = self.stop_sender.send(()).await;
        if let Err(e) = self.join.await {
            error!("Weather listener task failed to join: {}", e);
        }
        info!("Weather listener stopped.");
    }
}

impl<T: SyncTransport> WeatherListener<T> {
    pub fn new(transport: T, bus: LocalBroadcast) -> Self {
        Self { transport, bus, path: WEARABLE_DATA_PATH.to_string() }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Handle one batch of change events; returns how many weather
    /// broadcasts went out.
    pub fn on_data_changed(&self, events: &[DataEvent]) -> usize {
        debug!("data changed: {} event(s)", events.len());
        let mut sent = 0;
        for event in events {
            if event.kind != DataEventKind::Changed || event.item.path != self.path {
                continue;
            }
            let update = decode_weather(&event.item.data);
            debug!("weather record: {:?}", update);
            self.bus.send_weather(update);
            sent += 1;
        }
        sent
    }

    /// Connect, relay until the stream ends, reconnect on every failure.
    ///
    /// There is no backoff and no retry limit; the loop only yields to the
    /// runtime between attempts.
    pub async fn run(mut self) {
        let mut failures: u32 = 0;
        loop {
            match self.transport.connect().await {
                Ok(mut stream) => {
                    if failures > 1 {
                        info!("Data layer connected after {} failed attempts", failures);
                    }
                    failures = 0;
                    info!("Connected to data layer, listening on {}", self.path);
                    while let Some(batch) = stream.recv().await {
                        self.on_data_changed(&batch);
                    }
                    info!("Data layer stream closed.");
                    return;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    log!(retry_log_level(failures), "Data layer connection failed ({}): {}, retrying", failures, e);
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    /// Run the listener as a background task with a stop channel.
    pub fn spawn(self) -> ListenerHandle {
        let (stop_sender, mut stop_rx) = mpsc::channel(1);
        let join = tokio::spawn(async move {
            tokio::select! {
                _ = self.run() => {}
                _ = stop_rx.recv() => {
                    info!("Weather listener received stop signal. Exiting.");
                }
            }
        });
        ListenerHandle { stop_sender, join }
    }
}
