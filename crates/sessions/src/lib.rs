//! Session tracking for RelayChat.
//!
//! The [`SessionRegistry`] is the single owner of session state: which
//! conversations exist, which are active, and when they last changed. All
//! other components refer to sessions by id only and go through the registry
//! for every read or mutation.

pub mod registry;

pub use registry::SessionRegistry;
