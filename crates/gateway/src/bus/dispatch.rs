//! Per-connection egress filter over the bus's broadcast result stream.
//!
//! Each external listener gets its own [`Dispatcher`] task: it reads every
//! broadcast chunk, discards the ones tagged for other sessions, and pushes
//! matches into a small bounded output buffer. A full buffer drops the newest
//! chunk (logged) rather than stalling the bus, the opposite policy from the
//! blocking ingress queue. Drops never reorder the chunks that survive.

use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use rc_domain::{ResultChunk, SessionId};

use crate::bus::StreamingBus;

/// The consuming end of one dispatcher's output buffer.
///
/// Dropping the subscription unhooks the dispatcher: its task notices the
/// closed buffer on the next matching chunk and exits.
pub struct Subscription {
    session_id: SessionId,
    rx: mpsc::Receiver<ResultChunk>,
}

impl Subscription {
    /// Next chunk for this session, or `None` once the bus has shut down.
    pub async fn recv(&mut self) -> Option<ResultChunk> {
        self.rx.recv().await
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Filters the broadcast stream down to one session's chunks.
pub struct Dispatcher {
    session_id: SessionId,
    source: broadcast::Receiver<ResultChunk>,
    out: mpsc::Sender<ResultChunk>,
}

impl Dispatcher {
    /// Subscribe to `bus` on behalf of `session_id` and return the filtered,
    /// bounded output. One call per egress connection.
    pub fn attach(
        bus: &StreamingBus,
        session_id: SessionId,
        buffer_capacity: usize,
    ) -> Subscription {
        Self::spawn_with_source(bus.subscribe(), session_id, buffer_capacity)
    }

    pub(crate) fn spawn_with_source(
        source: broadcast::Receiver<ResultChunk>,
        session_id: SessionId,
        buffer_capacity: usize,
    ) -> Subscription {
        let (out, rx) = mpsc::channel(buffer_capacity);
        let dispatcher = Dispatcher {
            session_id: session_id.clone(),
            source,
            out,
        };
        tokio::spawn(dispatcher.run());
        Subscription { session_id, rx }
    }

    async fn run(mut self) {
        loop {
            match self.source.recv().await {
                Ok(chunk) => {
                    if chunk.session_id != self.session_id {
                        continue;
                    }
                    match self.out.try_send(chunk) {
                        Ok(()) => {}
                        Err(TrySendError::Full(chunk)) => {
                            tracing::warn!(
                                session_id = %self.session_id,
                                is_last = chunk.is_last,
                                "output buffer full, dropping chunk"
                            );
                        }
                        // Subscriber hung up.
                        Err(TrySendError::Closed(_)) => break,
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        missed,
                        "dispatcher lagging behind result stream"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!(session_id = %self.session_id, "dispatcher detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    fn chunk(session: &str, i: u32, last: bool) -> ResultChunk {
        ResultChunk::new(sid(session), format!("chunk {i}: x"), last)
    }

    async fn recv_within(sub: &mut Subscription, ms: u64) -> Option<ResultChunk> {
        tokio::time::timeout(Duration::from_millis(ms), sub.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn forwards_only_matching_session() {
        let (tx, _) = broadcast::channel(64);
        let mut sub = Dispatcher::spawn_with_source(tx.subscribe(), sid("a"), 16);

        tx.send(chunk("b", 1, false)).unwrap();
        tx.send(chunk("a", 1, false)).unwrap();
        tx.send(chunk("b", 2, true)).unwrap();
        tx.send(chunk("a", 2, true)).unwrap();

        let first = recv_within(&mut sub, 500).await.unwrap();
        let second = recv_within(&mut sub, 500).await.unwrap();
        assert_eq!(first.session_id, sid("a"));
        assert_eq!(second.session_id, sid("a"));
        assert_eq!(first.chunk, "chunk 1: x");
        assert!(second.is_last);
        assert!(recv_within(&mut sub, 50).await.is_none());
    }

    #[tokio::test]
    async fn overflow_drops_newest_and_keeps_survivor_order() {
        let (tx, _) = broadcast::channel(64);
        let mut sub = Dispatcher::spawn_with_source(tx.subscribe(), sid("a"), 3);

        for i in 1..=10 {
            tx.send(chunk("a", i, i == 10)).unwrap();
        }
        // Let the dispatcher chew through the backlog before draining.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut delivered = Vec::new();
        while let Some(c) = recv_within(&mut sub, 50).await {
            delivered.push(c);
        }
        // Capacity 3, no draining while the burst landed: the first three
        // chunks survive, in order; the rest were dropped, not reordered.
        assert_eq!(delivered.len(), 3);
        assert_eq!(delivered[0].chunk, "chunk 1: x");
        assert_eq!(delivered[1].chunk, "chunk 2: x");
        assert_eq!(delivered[2].chunk, "chunk 3: x");
    }

    #[tokio::test]
    async fn detaches_when_subscription_dropped() {
        let (tx, _) = broadcast::channel(64);
        let sub = Dispatcher::spawn_with_source(tx.subscribe(), sid("a"), 4);
        drop(sub);

        // The dispatcher exits on the next matching chunk; the channel must
        // not accumulate receivers forever.
        tx.send(chunk("a", 1, false)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tx.receiver_count(), 0);
    }
}
