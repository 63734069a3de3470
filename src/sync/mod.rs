/*
 *  sync/mod.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Data-sync channel model: records, change events and the transport seam
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
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

pub mod channel;
pub mod jsonl;

pub use channel::{ChannelTransport, DataEventSender};
pub use jsonl::JsonLinesTransport;

/// Error type for the sync transport.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single value inside a [`DataMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Key/value payload of a synced record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataMap(BTreeMap<String, DataValue>);

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.to_string(), DataValue::String(value.into()));
        self
    }

    pub fn put_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.0.insert(key.to_string(), DataValue::Int(value));
        self
    }

    /// String value, `None` when absent or of another type.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(DataValue::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Integer value, `None` when absent, of another type or outside `i32`.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.0.get(key) {
            Some(DataValue::Int(i)) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

/// A record at a path in the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub path: String,
    #[serde(default)]
    pub data: DataMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// Change notification for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEvent {
    #[serde(rename = "type")]
    pub kind: DataEventKind,
    pub item: DataItem,
}

impl DataEvent {
    pub fn changed(path: &str, data: DataMap) -> Self {
        Self { kind: DataEventKind::Changed, item: DataItem { path: path.to_string(), data } }
    }

    pub fn deleted(path: &str) -> Self {
        Self { kind: DataEventKind::Deleted, item: DataItem { path: path.to_string(), data: DataMap::new() } }
    }
}

/// Batches of change events, in delivery order.
pub type EventStream = mpsc::Receiver<Vec<DataEvent>>;

/// The managed data-sync service.
///
/// `connect` either yields the stream of change batches or fails; the
/// caller decides whether to try again. The stream ending means the
/// service went away for good.
pub trait SyncTransport: Send + 'static {
    fn connect(&mut self) -> impl Future<Output = Result<EventStream, SyncError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_map_typed_getters() {
        let mut map = DataMap::new();
        map.put_string("max", "75°").put_int("weather_id", 800);
        assert_eq!(map.get_string("max").as_deref(), Some("75°"));
        assert_eq!(map.get_int("weather_id"), Some(800));
        // wrong type reads as absent
        assert_eq!(map.get_int("max"), None);
        assert_eq!(map.get_string("weather_id"), None);
        assert_eq!(map.get_string("min"), None);
    }

    #[test]
    fn test_int_outside_i32_is_absent() {
        let mut map = DataMap::new();
        map.put_int("weather_id", i64::from(i32::MAX) + 1);
        assert_eq!(map.get_int("weather_id"), None);
    }

    #[test]
    fn test_event_json_shape() {
        let line = r#"{"type":"changed","item":{"path":"/wearable","data":{"max":"75°","min":"52°","weather_id":800}}}"#;
        let ev: DataEvent = serde_json::from_str(line).unwrap();
        assert_eq!(ev.kind, DataEventKind::Changed);
        assert_eq!(ev.item.path, "/wearable");
        assert_eq!(ev.item.data.get_int("weather_id"), Some(800));

        let del: DataEvent = serde_json::from_str(r#"{"type":"deleted","item":{"path":"/wearable"}}"#).unwrap();
        assert_eq!(del, DataEvent::deleted("/wearable"));
    }
}
