//! # Events emitted by the signal handler and its listener.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Registry events**: units added, removed or pruned
//! - **Delivery events**: cancellation requested and delivered
//! - **Listener events**: listener lifecycle and received triggers
//!
//! The [`Event`] struct carries metadata such as the timestamp, the cancel code,
//! the unit identity and the trigger that caused delivery.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are read from several receivers.
//!
//! ## Example
//! ```rust
//! use cancelvisor::{Event, EventKind, Trigger};
//!
//! let ev = Event::new(EventKind::TriggerReceived)
//!     .with_trigger(Trigger::Interrupt)
//!     .with_code(0);
//!
//! assert_eq!(ev.kind, EventKind::TriggerReceived);
//! assert_eq!(ev.trigger, Some(Trigger::Interrupt));
//! assert_eq!(ev.code, Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Trigger;
use crate::holder::TargetId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of handler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// A unit was registered.
    ///
    /// Sets:
    /// - `target`: unit identity
    CancelableAdded,

    /// A unit was deregistered (explicitly, on drop, or by `reset`).
    ///
    /// Sets:
    /// - `target`: unit identity
    CancelableRemoved,

    /// An entry whose unit was already destroyed was dropped from the registry.
    ///
    /// Sets:
    /// - `target`: identity the dead entry carried
    EntryPruned,

    // === Delivery events ===
    /// `cancel_all` started.
    ///
    /// Sets:
    /// - `code`: code being delivered
    CancelRequested,

    /// A live unit received `cancel(code)`.
    ///
    /// Sets:
    /// - `target`: unit identity
    /// - `code`: delivered code
    CancelDelivered,

    /// `exit` recorded a return code and is about to cancel everything.
    ///
    /// Sets:
    /// - `code`: return code
    ExitRequested,

    // === Listener events ===
    /// The listener thread is waiting for a trigger.
    ListenerStarted,

    /// The listener observed an OS signal or an in-process trigger.
    ///
    /// Sets:
    /// - `trigger`: what was observed
    /// - `code`: code it maps to
    TriggerReceived,

    /// The listener thread is about to exit.
    ///
    /// Sets:
    /// - `reason`: `"triggered"`, `"join_requested"` or a failure description
    ListenerStopped,
}

/// Handler event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Cancel or return code, if applicable.
    pub code: Option<i32>,
    /// Identity of the unit involved, if applicable.
    pub target: Option<TargetId>,
    /// Trigger that caused the event, if applicable.
    pub trigger: Option<Trigger>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            code: None,
            target: None,
            trigger: None,
            reason: None,
        }
    }

    /// Attaches a cancel or return code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a unit identity.
    #[inline]
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    /// Attaches the trigger that caused this event.
    #[inline]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
