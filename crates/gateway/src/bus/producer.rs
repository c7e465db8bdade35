//! The producer side of the bus: the trait the loop drives, and the mock
//! inference worker that stands in for a real model backend.

use std::time::Duration;

use rc_domain::config::StreamConfig;
use rc_domain::stream::BoxStream;
use rc_domain::{RequestMessage, ResultChunk};

/// Turns one accepted request into an ordered, finite chunk stream.
///
/// The bus drives a single `Producer` sequentially. Implementations control
/// chunk pacing; the bus owns queueing and fan-out.
pub trait Producer: Send + Sync + 'static {
    fn produce(&self, request: RequestMessage) -> BoxStream<'static, ResultChunk>;
}

/// Mock inference worker: emits a fixed number of chunks at a fixed spacing,
/// each echoing the request content, the last one flagged.
pub struct MockProducer {
    chunk_count: u32,
    chunk_interval: Duration,
}

impl MockProducer {
    pub fn new(chunk_count: u32, chunk_interval: Duration) -> Self {
        Self {
            chunk_count,
            chunk_interval,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.chunk_count, config.chunk_interval())
    }
}

impl Producer for MockProducer {
    fn produce(&self, request: RequestMessage) -> BoxStream<'static, ResultChunk> {
        let count = self.chunk_count;
        let interval = self.chunk_interval;
        Box::pin(async_stream::stream! {
            for i in 1..=count {
                tokio::time::sleep(interval).await;
                yield ResultChunk::new(
                    request.session_id.clone(),
                    format!("chunk {i}: {}", request.content),
                    i == count,
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    use rc_domain::SessionId;

    #[tokio::test]
    async fn mock_producer_emits_indexed_chunks() {
        let producer = MockProducer::new(3, Duration::from_millis(1));
        let request = RequestMessage::new(SessionId::new("s1").unwrap(), "hello");

        let chunks: Vec<ResultChunk> = producer.produce(request).collect().await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk, "chunk 1: hello");
        assert_eq!(chunks[2].chunk, "chunk 3: hello");
        assert!(!chunks[0].is_last);
        assert!(!chunks[1].is_last);
        assert!(chunks[2].is_last);
    }
}
