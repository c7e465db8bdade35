//! Shared domain types for RelayChat: session identity, message shapes,
//! configuration, and the common error type.

pub mod config;
pub mod error;
pub mod message;
pub mod session;
pub mod stream;

pub use error::{Error, Result};
pub use message::{RequestMessage, ResultChunk};
pub use session::{Session, SessionId};
