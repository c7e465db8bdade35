use std::time::Duration;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Streaming pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tuning for the streaming bus, the mock producer, and the per-connection
/// pumps.
///
/// The two capacities encode the backpressure asymmetry: the request queue is
/// **blocking** when full (a user's input must never be silently dropped),
/// while each dispatcher's output buffer is **lossy** when full (a missed
/// display chunk is recoverable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Number of chunks the mock producer emits per request.
    #[serde(default = "d_chunk_count")]
    pub chunk_count: u32,

    /// Spacing between consecutive chunks, in milliseconds.
    #[serde(default = "d_chunk_interval_ms")]
    pub chunk_interval_ms: u64,

    /// Outstanding requests across all sessions before `publish` blocks.
    #[serde(default = "d_request_queue_capacity")]
    pub request_queue_capacity: usize,

    /// Per-dispatcher output buffer; overflow drops the newest chunk.
    #[serde(default = "d_dispatch_buffer_capacity")]
    pub dispatch_buffer_capacity: usize,

    /// Capacity of the broadcast result channel shared by all dispatchers.
    #[serde(default = "d_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// How long a WebSocket connection may stay silent before it is
    /// considered dead. The heartbeat interval is derived from this
    /// (`read_timeout * 9 / 10`).
    #[serde(default = "d_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Deadline for a single outbound WebSocket write.
    #[serde(default = "d_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_count: d_chunk_count(),
            chunk_interval_ms: d_chunk_interval_ms(),
            request_queue_capacity: d_request_queue_capacity(),
            dispatch_buffer_capacity: d_dispatch_buffer_capacity(),
            broadcast_capacity: d_broadcast_capacity(),
            read_timeout_secs: d_read_timeout_secs(),
            write_timeout_secs: d_write_timeout_secs(),
        }
    }
}

impl StreamConfig {
    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.chunk_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Liveness probe interval: nine tenths of the read timeout, so a probe
    /// is always in flight before the peer's deadline expires.
    pub fn heartbeat_interval(&self) -> Duration {
        self.read_timeout() * 9 / 10
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_chunk_count() -> u32 {
    5
}
fn d_chunk_interval_ms() -> u64 {
    400
}
fn d_request_queue_capacity() -> usize {
    1024
}
fn d_dispatch_buffer_capacity() -> usize {
    128
}
fn d_broadcast_capacity() -> usize {
    256
}
fn d_read_timeout_secs() -> u64 {
    30
}
fn d_write_timeout_secs() -> u64 {
    5
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.chunk_count, 5);
        assert_eq!(cfg.chunk_interval_ms, 400);
        assert_eq!(cfg.request_queue_capacity, 1024);
        assert_eq!(cfg.dispatch_buffer_capacity, 128);
        assert_eq!(cfg.read_timeout_secs, 30);
        assert_eq!(cfg.write_timeout_secs, 5);
    }

    #[test]
    fn heartbeat_is_nine_tenths_of_read_timeout() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.heartbeat_interval(), Duration::from_secs(27));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: StreamConfig = toml::from_str("chunk_interval_ms = 10").unwrap();
        assert_eq!(cfg.chunk_interval_ms, 10);
        assert_eq!(cfg.chunk_count, 5);
    }
}
