//! RelayChat gateway: the streaming bus, the mock inference producer, and the
//! HTTP/WebSocket/SSE surface that connects clients to it.

pub mod api;
pub mod bootstrap;
pub mod bus;
pub mod chat;
pub mod cli;
pub mod state;
