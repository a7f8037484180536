//! Handler events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the signal handler and its listener.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - `Bus` thin wrapper over `tokio::sync::broadcast` (crate-internal)
//!
//! ## Quick reference
//! - **Publishers**: `SignalHandler` registry operations, `cancel_all`, `exit`,
//!   the listener thread.
//! - **Consumers**: whatever holds a receiver from `SignalHandler::subscribe()`.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
