//! Runtime core: registry, delivery and signal listening.
//!
//! The only entry point from this module is [`SignalHandler`], which owns the
//! registry of cancelable units and the optional listener thread.
//!
//! Internal modules:
//! - [`config`]: handler settings and trigger-to-code mapping;
//! - [`handler`]: registration, `cancel_all`, exit bookkeeping, join;
//! - [`listener`]: background thread waiting for the first trigger;
//! - [`registry`]: ordered weak entries, one per identity;
//! - [`shutdown`]: cross-platform OS signal handling.

mod config;
mod handler;
mod listener;
mod registry;
mod shutdown;

pub use config::Config;
pub use handler::SignalHandler;
pub use listener::ListenerState;
pub use shutdown::Trigger;

pub(crate) use handler::Shared;
