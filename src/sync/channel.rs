/*
 *  sync/channel.rs
 *
 *  SunshineWear - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory sync transport for embedding and tests
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

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::{DataEvent, EventStream, SyncError, SyncTransport};

/// Producer half of a [`ChannelTransport`]; plays the phone's side.
#[derive(Debug, Clone)]
pub struct DataEventSender {
    tx: mpsc::Sender<Vec<DataEvent>>,
}

impl DataEventSender {
    /// Deliver one batch. Fails only once the transport side is gone.
    pub async fn send(&self, batch: Vec<DataEvent>) -> Result<(), SyncError> {
        self.tx
            .send(batch)
            .await
            .map_err(|_| SyncError::Connection("data layer closed".to_string()))
    }
}

/// Transport fed from a channel.
///
/// The first `failures` connect attempts fail, which lets callers exercise
/// reconnect handling. After that the single event stream is handed out.
#[derive(Debug)]
pub struct ChannelTransport {
    stream: Option<EventStream>,
    failures: usize,
    attempts: Arc<AtomicUsize>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, DataEventSender) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let transport = Self {
            stream: Some(rx),
            failures: 0,
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        (transport, DataEventSender { tx })
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    /// Shared counter of connect attempts.
    pub fn attempts(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

impl SyncTransport for ChannelTransport {
    fn connect(&mut self) -> impl Future<Output = Result<EventStream, SyncError>> + Send {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let result = if self.failures > 0 {
            self.failures -= 1;
            Err(SyncError::Connection(format!("attempt {attempt} refused")))
        } else {
            self.stream
                .take()
                .ok_or_else(|| SyncError::Connection("stream already consumed".to_string()))
        };
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failures_then_stream() {
        let (transport, _tx) = ChannelTransport::new(4);
        let mut transport = transport.with_failures(2);
        assert!(transport.connect().await.is_err());
        assert!(transport.connect().await.is_err());
        assert!(transport.connect().await.is_ok());
        assert_eq!(transport.attempts().load(Ordering::SeqCst), 3);
        // only one stream to hand out
        assert!(transport.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_batches_flow_through() {
        let (mut transport, tx) = ChannelTransport::new(4);
        let mut stream = transport.connect().await.unwrap();
        tx.send(vec![DataEvent::deleted("/wearable")]).await.unwrap();
        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
    }
}
