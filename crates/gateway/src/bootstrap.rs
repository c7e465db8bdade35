//! AppState construction extracted from `main.rs` so tests and future CLI
//! one-shots can boot the full pipeline without an HTTP listener.

use std::sync::Arc;

use rc_domain::config::{Config, ConfigSeverity};
use rc_sessions::SessionRegistry;

use crate::bus::{MockProducer, StreamingBus};
use crate::chat::ChatService;
use crate::state::AppState;

/// Validate config, wire the registry, bus, producer, and chat service, and
/// start the producer loop.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Session registry ─────────────────────────────────────────────
    let registry = Arc::new(SessionRegistry::new());
    tracing::info!("session registry ready");

    // ── Streaming bus + mock producer ────────────────────────────────
    let producer = Arc::new(MockProducer::from_config(&config.stream));
    let bus = Arc::new(StreamingBus::new(producer, &config.stream));
    bus.start_producer();
    tracing::info!(
        chunk_count = config.stream.chunk_count,
        chunk_interval_ms = config.stream.chunk_interval_ms,
        request_queue = config.stream.request_queue_capacity,
        "streaming bus ready"
    );

    // ── Chat service ─────────────────────────────────────────────────
    let chat = Arc::new(ChatService::new(registry.clone(), bus.clone()));

    Ok(AppState {
        config,
        registry,
        bus,
        chat,
    })
}
