//! The streaming bus: a bounded request queue drained by one sequential
//! producer loop, fanned back out over a broadcast result stream.
//!
//! Flow:
//! 1. `publish` enqueues a [`RequestMessage`] (blocking when the queue is
//!    full; an accepted user input is never dropped)
//! 2. the producer loop pulls requests one at a time and streams each
//!    request's chunks to completion before looking at the next
//! 3. every chunk is broadcast; per-connection [`dispatch::Dispatcher`]s
//!    filter the stream down to their own session
//!
//! The single-worker design means sessions interleave only at whole-request
//! granularity: session A's chunks are never mixed with session B's. That is
//! a documented capacity limit of the mock producer, kept behind the
//! [`Producer`] trait so a pooled implementation can replace it without
//! touching the bus contract.

pub mod dispatch;
pub mod producer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use rc_domain::config::StreamConfig;
use rc_domain::error::{Error, Result};
use rc_domain::{RequestMessage, ResultChunk};

pub use dispatch::{Dispatcher, Subscription};
pub use producer::{MockProducer, Producer};

/// In-process request/result channel pair with a background producer loop.
pub struct StreamingBus {
    request_tx: mpsc::Sender<RequestMessage>,
    /// Taken exactly once by the producer loop.
    request_rx: Mutex<Option<mpsc::Receiver<RequestMessage>>>,
    result_tx: broadcast::Sender<ResultChunk>,
    producer: Arc<dyn Producer>,
    started: AtomicBool,
}

impl StreamingBus {
    /// Build a bus around `producer` with the configured queue capacities.
    pub fn new(producer: Arc<dyn Producer>, config: &StreamConfig) -> Self {
        let (request_tx, request_rx) = mpsc::channel(config.request_queue_capacity);
        let (result_tx, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            request_tx,
            request_rx: Mutex::new(Some(request_rx)),
            result_tx,
            producer,
            started: AtomicBool::new(false),
        }
    }

    /// Enqueue a request for the producer.
    ///
    /// Waits for queue space when the request queue is at capacity; only a
    /// closed queue (producer loop gone) is an error.
    pub async fn publish(&self, request: RequestMessage) -> Result<()> {
        tracing::debug!(
            session_id = %request.session_id,
            request_id = %request.id,
            "request queued"
        );
        self.request_tx
            .send(request)
            .await
            .map_err(|_| Error::Bus("request queue is closed".into()))
    }

    /// Subscribe to the broadcast result stream. Every subscriber sees every
    /// chunk from every session; filtering is the dispatcher's job.
    pub fn subscribe(&self) -> broadcast::Receiver<ResultChunk> {
        self.result_tx.subscribe()
    }

    /// Launch the background producer loop. Idempotent: the second and later
    /// calls log and return without spawning a competing loop.
    pub fn start_producer(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("producer loop already running, ignoring start");
            return;
        }
        let mut request_rx = self
            .request_rx
            .lock()
            .take()
            .expect("request receiver present on first start");

        let producer = self.producer.clone();
        let result_tx = self.result_tx.clone();
        tokio::spawn(async move {
            tracing::info!("producer loop started");
            while let Some(request) = request_rx.recv().await {
                tracing::info!(
                    session_id = %request.session_id,
                    request_id = %request.id,
                    "processing request"
                );
                let mut chunks = producer.produce(request);
                while let Some(chunk) = chunks.next().await {
                    // Err means no live subscriber right now; result delivery
                    // is best-effort once a request is accepted.
                    if result_tx.send(chunk).is_err() {
                        tracing::debug!("no subscribers, chunk discarded");
                    }
                }
            }
            tracing::info!("request queue closed, producer loop exiting");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rc_domain::SessionId;

    fn test_bus(chunk_count: u32) -> Arc<StreamingBus> {
        let config = StreamConfig {
            chunk_count,
            chunk_interval_ms: 2,
            ..StreamConfig::default()
        };
        let producer = Arc::new(MockProducer::from_config(&config));
        Arc::new(StreamingBus::new(producer, &config))
    }

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    async fn collect(
        rx: &mut broadcast::Receiver<ResultChunk>,
        n: usize,
    ) -> Vec<ResultChunk> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let chunk = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("chunk within deadline")
                .expect("result stream open");
            out.push(chunk);
        }
        out
    }

    #[tokio::test]
    async fn emits_ordered_chunks_with_terminal_marker() {
        let bus = test_bus(5);
        bus.start_producer();
        let mut rx = bus.subscribe();

        bus.publish(RequestMessage::new(sid("s1"), "hi"))
            .await
            .unwrap();

        let chunks = collect(&mut rx, 5).await;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.session_id, sid("s1"));
            assert_eq!(chunk.chunk, format!("chunk {}: hi", i + 1));
            assert_eq!(chunk.is_last, i == 4);
        }
    }

    #[tokio::test]
    async fn requests_are_drained_strictly_sequentially() {
        let bus = test_bus(5);
        bus.start_producer();
        let mut rx = bus.subscribe();

        bus.publish(RequestMessage::new(sid("a"), "first"))
            .await
            .unwrap();
        bus.publish(RequestMessage::new(sid("b"), "second"))
            .await
            .unwrap();

        // One producer: all of a's chunks land before any of b's.
        let chunks = collect(&mut rx, 10).await;
        assert!(chunks[..5].iter().all(|c| c.session_id == sid("a")));
        assert!(chunks[5..].iter().all(|c| c.session_id == sid("b")));
        assert!(chunks[4].is_last);
        assert!(chunks[9].is_last);
    }

    #[tokio::test]
    async fn start_producer_is_idempotent() {
        let bus = test_bus(3);
        bus.start_producer();
        bus.start_producer();
        let mut rx = bus.subscribe();

        bus.publish(RequestMessage::new(sid("s1"), "once"))
            .await
            .unwrap();

        let chunks = collect(&mut rx, 3).await;
        assert!(chunks[2].is_last);
        // A competing second loop would double-emit; the queue must be idle.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
