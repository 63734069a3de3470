/*
 *  sync/jsonl.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Replay transport reading one JSON data event per line
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

use log::{debug, info, warn};
use std::future::Future;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::{DataEvent, EventStream, SyncError, SyncTransport};

const STREAM_CAPACITY: usize = 32;

/// Reads data events from a file, or stdin when no path is given.
///
/// Each connect starts reading from the top. Lines that do not parse are
/// skipped with a warning; blank lines are ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesTransport {
    source: Option<PathBuf>,
}

impl JsonLinesTransport {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }

    pub fn stdin() -> Self {
        Self { source: None }
    }
}

impl SyncTransport for JsonLinesTransport {
    fn connect(&mut self) -> impl Future<Output = Result<EventStream, SyncError>> + Send {
        let source = self.source.clone();
        async move {
            let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
            match source {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await.map_err(|e| {
                        SyncError::Connection(format!("{}: {e}", path.display()))
                    })?;
                    info!("Replaying data events from {}", path.display());
                    tokio::spawn(pump_lines(file, tx));
                }
                None => {
                    info!("Reading data events from stdin");
                    tokio::spawn(pump_lines(tokio::io::stdin(), tx));
                }
            }
            Ok(rx)
        }
    }
}

async fn pump_lines<R>(reader: R, tx: mpsc::Sender<Vec<DataEvent>>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut line_no = 0usize;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("data event source read failed: {e}");
                break;
            }
        };
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match decode_line(trimmed) {
            Ok(event) => {
                if tx.send(vec![event]).await.is_err() {
                    debug!("data event consumer gone, stop reading");
                    return;
                }
            }
            Err(e) => warn!("skipping data event line {line_no}: {e}"),
        }
    }
    debug!("data event source exhausted after {line_no} line(s)");
}

pub fn decode_line(line: &str) -> Result<DataEvent, SyncError> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_replays_file_skipping_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type":"changed","item":{{"path":"/wearable","data":{{"max":"75°","min":"52°","weather_id":800}}}}}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"type":"deleted","item":{{"path":"/wearable"}}}}"#).unwrap();
        file.flush().unwrap();

        let mut transport = JsonLinesTransport::new(Some(file.path().to_path_buf()));
        let mut stream = transport.connect().await.unwrap();
        let first = stream.recv().await.unwrap();
        assert_eq!(first[0].item.data.get_string("max").as_deref(), Some("75°"));
        let second = stream.recv().await.unwrap();
        assert_eq!(second[0], DataEvent::deleted("/wearable"));
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_error() {
        let mut transport = JsonLinesTransport::new(Some(PathBuf::from("/nonexistent/events.jsonl")));
        match transport.connect().await {
            Err(SyncError::Connection(_)) => {}
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_line_error() {
        assert!(matches!(decode_line("{"), Err(SyncError::Decode(_))));
    }
}
