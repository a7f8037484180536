//! # cancelvisor
//!
//! **Cancelvisor** is a small cooperative-cancellation library for Rust.
//!
//! Long-running units (threads, loops, workers) implement [`Cancelable`] and
//! poll their own flag. A [`SignalHandler`] keeps a registry of *weak*
//! references to those units and, when a termination trigger arrives (an OS
//! signal or an explicit call), delivers a cancel code to every unit still
//! alive. Units may be destroyed at any time; the handler never keeps them
//! alive and never touches a destroyed one.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Arc<Worker> │   │ Exclusive<W> │   │ &'static W   │
//!     │   (shared)   │   │   (unique)   │   │ (unmanaged)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ WeakHolder       ▼ WeakHolder       ▼ WeakHolder
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SignalHandler                                                    │
//! │  - Registry (ordered weak entries, one per identity)              │
//! │  - Bus (broadcast events)                                         │
//! │  - exit state (got_exit_signal, return_code)                      │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ cancel_all(code) / exit(code)                    │
//!        ▼                                                  │
//!   for each live unit: unit.cancel(code)                   │
//!        ▲                                                  │
//!        │ on_trigger(code_for(trigger))                    ▼
//! ┌──────┴───────────────────────────┐        ┌─────────────────────────┐
//! │ listener thread (optional)       │        │ Bus subscribers         │
//! │ SIGINT/SIGQUIT → success_code    │        │ (SignalHandler::        │
//! │ SIGTERM        → error_code      │        │  subscribe)             │
//! └──────────────────────────────────┘        └─────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! unit created ──► add_cancelable ──► (registered, linked to handler)
//!      │                                    │
//!      │ unit dropped ──► deregisters       │ trigger / cancel_all
//!      │                                    ▼
//!      └──────────────────────────── cancel(code) latched; unit stops itself
//!
//! handler dropped ──► listener joined ──► registry released
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Cancellation**  | Latch-once code, reset, timed wait, hooks.                  | [`Cancelable`], [`CancelState`], [`CancelFlag`] |
//! | **Weak handles**  | Non-owning references with expiry and identity.             | [`WeakHolder`], [`Exclusive`], [`TargetId`] |
//! | **Coordination**  | Registry, fan-out, OS signal listener, deterministic join.  | [`SignalHandler`], [`Trigger`]              |
//! | **Events**        | Broadcast of registry and delivery events.                  | [`Event`], [`EventKind`]                    |
//! | **Errors**        | Typed errors for holders, waits and listener spawning.      | [`WeakHolderError`], [`CancelError`], [`RuntimeError`] |
//! | **Configuration** | Listener switch, code mapping, bus capacity.                | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//! use cancelvisor::{CancelFlag, Cancelable, SignalHandler};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // `true` would also listen for SIGINT/SIGTERM/SIGQUIT
//!     let handler = SignalHandler::new(false)?;
//!
//!     let stop = Arc::new(CancelFlag::new());
//!     handler.add_cancelable(&stop);
//!
//!     let worker = {
//!         let stop = Arc::clone(&stop);
//!         thread::spawn(move || {
//!             while !stop.is_canceled() {
//!                 thread::sleep(Duration::from_millis(1));
//!             }
//!             stop.cancel_code()
//!         })
//!     };
//!
//!     handler.exit(0);
//!     assert_eq!(worker.join().unwrap(), 0);
//!     assert!(handler.got_exit_signal());
//!     Ok(())
//! }
//! ```
mod cancel;
mod core;
mod error;
mod events;
mod holder;

// ---- Public re-exports ----

pub use cancel::{CancelFlag, CancelState, Cancelable};
pub use crate::core::{Config, ListenerState, SignalHandler, Trigger};
pub use error::{CancelError, RuntimeError, WeakHolderError};
pub use events::{Event, EventKind};
pub use holder::{Exclusive, Origin, TargetId, WeakHolder};
