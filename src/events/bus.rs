//! # Event bus for broadcasting handler events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the caller threads and the listener thread.
//!
//! ## Architecture
//! ```text
//! Publishers:                            Receivers (any number):
//!   add/remove_cancelable ──┐
//!   cancel_all / exit     ──┼──► Bus ──► SignalHandler::subscribe() ──► user code
//!   listener thread       ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and needs no async runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for handler events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub(crate) fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// Receivers can be drained synchronously with `try_recv`, or awaited with
    /// `recv` inside an async runtime.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ListenerStarted));

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_receiver_sees_later_events_in_order() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::ListenerStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::CancelRequested).with_code(1));
        bus.publish(Event::new(EventKind::ListenerStopped));

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::CancelRequested);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ListenerStopped);
        assert!(rx.try_recv().is_err());
    }
}
