//! # SignalHandler: fans cancellation out to registered units.
//!
//! The [`SignalHandler`] owns a registry of weakly-held [`Cancelable`] units,
//! an event bus, and (optionally) a background listener thread.
//!
//! ## Key responsibilities
//! - register / deregister units by identity without owning them
//! - deliver `cancel(code)` to every live unit, in registration order
//! - prune entries whose unit was destroyed
//! - turn OS signals (SIGINT/SIGTERM/SIGQUIT) into a `cancel_all`
//! - join the listener deterministically on drop
//!
//! ## Architecture
//! ```text
//!   add_cancelable(&Arc<C>) ──► Registry [WeakHolder<dyn Cancelable>, ...]
//!                               (insertion order, one entry per identity)
//!
//!   cancel_all(code):
//!     lock ─► prune expired ─► copy entries ─► unlock
//!     for entry in copy:
//!         entry.with(|unit| unit.cancel(code))   (temporary strong hold)
//!             ├─ live    ─► CancelDelivered
//!             └─ expired ─► removed, EntryPruned
//!
//!   listener thread ─► Trigger ─► exit(code_for(trigger)) ─► cancel_all
//!
//!   Drop ─► join_waiting_thread() ─► registry released
//! ```
//!
//! ## Snapshot semantics
//! `cancel_all` delivers to the entries present when it took its snapshot. A
//! unit added while delivery is running is not canceled by that call; a unit
//! removed while delivery is running may still receive the code. The registry
//! itself is never observed half-updated.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use cancelvisor::{CancelFlag, Cancelable, SignalHandler};
//!
//! let handler = SignalHandler::new(false).unwrap();
//! let worker = Arc::new(CancelFlag::new());
//! handler.add_cancelable(&worker);
//!
//! handler.cancel_all(0);
//! assert!(worker.is_canceled());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::cancel::Cancelable;
use crate::core::Config;
use crate::core::listener::{Listener, ListenerState};
use crate::core::registry::Registry;
use crate::core::shutdown::Trigger;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::holder::{TargetId, WeakHolder};

/// State shared between the handler, its listener thread and unit links.
pub(crate) struct Shared {
    pub(crate) cfg: Config,
    pub(crate) bus: Bus,
    registry: Registry,
    exited: AtomicBool,
    return_code: AtomicI32,
    state: Mutex<ListenerState>,
}

impl Shared {
    fn new(cfg: Config) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let return_code = AtomicI32::new(cfg.success_code);
        Self {
            cfg,
            bus,
            registry: Registry::default(),
            exited: AtomicBool::new(false),
            return_code,
            state: Mutex::new(ListenerState::Idle),
        }
    }

    pub(crate) fn set_state(&self, state: ListenerState) {
        *self.state.lock() = state;
    }

    /// Removes `id` from the registry. Does not touch the unit.
    pub(crate) fn forget(&self, id: TargetId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            debug!(target_id = %id, "removed cancelable");
            self.bus
                .publish(Event::new(EventKind::CancelableRemoved).with_target(id));
        }
        removed
    }

    pub(crate) fn cancel_all(&self, code: i32) -> usize {
        debug!(code, "canceling all cancelables");
        self.bus
            .publish(Event::new(EventKind::CancelRequested).with_code(code));

        let (live, pruned) = self.registry.snapshot();
        for id in pruned {
            self.publish_pruned(id);
        }

        let mut delivered = 0;
        for entry in live {
            let Some(id) = entry.id() else { continue };
            match entry.with(|unit| unit.cancel(code)) {
                Some(()) => {
                    delivered += 1;
                    self.bus.publish(
                        Event::new(EventKind::CancelDelivered)
                            .with_target(id)
                            .with_code(code),
                    );
                }
                None => {
                    if self.registry.remove(id) {
                        self.publish_pruned(id);
                    }
                }
            }
        }

        debug!(code, delivered, "cancellation delivered");
        delivered
    }

    pub(crate) fn exit(&self, code: i32) -> usize {
        self.exited.store(true, Ordering::Release);
        self.return_code.store(code, Ordering::Release);
        info!(code, "exit requested; canceling all cancelables");
        self.bus
            .publish(Event::new(EventKind::ExitRequested).with_code(code));
        self.cancel_all(code)
    }

    pub(crate) fn on_trigger(&self, trigger: Trigger) {
        let code = self.cfg.code_for(trigger);
        info!(%trigger, code, "handling termination trigger");
        self.bus.publish(
            Event::new(EventKind::TriggerReceived)
                .with_trigger(trigger)
                .with_code(code),
        );
        self.exit(code);
    }

    fn publish_pruned(&self, id: TargetId) {
        debug!(target_id = %id, "pruned expired cancelable");
        self.bus
            .publish(Event::new(EventKind::EntryPruned).with_target(id));
    }
}

/// Coordinates cancellation of registered units, optionally driven by OS signals.
///
/// Units are held through [`WeakHolder`]s: the handler never keeps a unit alive,
/// and a unit may be dropped at any time without deregistering first.
pub struct SignalHandler {
    shared: Arc<Shared>,
    listener: Mutex<Option<Listener>>,
}

impl SignalHandler {
    /// Creates a handler with the default [`Config`], spawning the listener
    /// thread if `listen` is true.
    pub fn new(listen: bool) -> Result<Self, RuntimeError> {
        Self::with_config(Config {
            listen,
            ..Config::default()
        })
    }

    /// Creates a handler from an explicit configuration.
    ///
    /// # Errors
    /// [`RuntimeError::ListenerSpawn`] if `cfg.listen` is set and the listener
    /// thread, its runtime or its signal registration cannot be created.
    pub fn with_config(cfg: Config) -> Result<Self, RuntimeError> {
        let shared = Arc::new(Shared::new(cfg));
        let listener = if shared.cfg.listen {
            Some(Listener::spawn(Arc::clone(&shared))?)
        } else {
            None
        };

        Ok(Self {
            shared,
            listener: Mutex::new(listener),
        })
    }

    /// Registers a shared unit. Returns `false` if it was already registered.
    ///
    /// The unit is held weakly and linked back to this handler, so dropping it
    /// deregisters it.
    pub fn add_cancelable<C: Cancelable + 'static>(&self, unit: &Arc<C>) -> bool {
        let weak: Weak<C> = Arc::downgrade(unit);
        let weak: Weak<dyn Cancelable> = weak;
        self.add_holder(WeakHolder::from_weak(weak))
    }

    /// Registers any weakly-held unit (shared, exclusive or static).
    ///
    /// Returns `false` for duplicates and for empty or expired holders.
    pub fn add_holder(&self, holder: WeakHolder<dyn Cancelable>) -> bool {
        let Some(id) = holder.id() else {
            return false;
        };
        if holder.expired() {
            return false;
        }

        let link = holder.clone();
        if !self.shared.registry.insert(holder) {
            debug!(target_id = %id, "cancelable already registered");
            return false;
        }
        link.with(|unit| unit.cancel_state().attach(&self.shared, id));

        debug!(target_id = %id, "added cancelable");
        self.shared
            .bus
            .publish(Event::new(EventKind::CancelableAdded).with_target(id));
        true
    }

    /// Deregisters `unit`. Returns `false` if it was not registered.
    pub fn remove_cancelable<C: Cancelable + ?Sized>(&self, unit: &C) -> bool {
        unit.cancel_state().unlink(self.id());
        self.shared.forget(TargetId::of(unit))
    }

    /// Deregisters by identity. Safe after the unit has been destroyed.
    pub fn remove_id(&self, id: TargetId) -> bool {
        self.shared.forget(id)
    }

    /// Delivers `cancel(code)` to every registered, live unit in registration
    /// order. Returns how many units were reached.
    pub fn cancel_all(&self, code: i32) -> usize {
        self.shared.cancel_all(code)
    }

    /// Records `code` as the return code, then cancels every unit with it.
    pub fn exit(&self, code: i32) -> usize {
        self.shared.exit(code)
    }

    /// Delivers `trigger` through the same path an OS signal takes.
    ///
    /// With a waiting listener the trigger is handed to it and `true` is
    /// returned. Otherwise it is handled on the calling thread and the result
    /// is `false`.
    pub fn raise(&self, trigger: Trigger) -> bool {
        let handed_off = self
            .listener
            .lock()
            .as_ref()
            .is_some_and(|l| l.send(trigger));
        if !handed_off {
            self.shared.on_trigger(trigger);
        }
        handed_off
    }

    /// True once an exit was requested (by a trigger or by [`exit`](Self::exit)).
    pub fn got_exit_signal(&self) -> bool {
        self.shared.exited.load(Ordering::Acquire)
    }

    /// The code recorded by the last exit, or `Config::success_code`.
    pub fn return_code(&self) -> i32 {
        self.shared.return_code.load(Ordering::Acquire)
    }

    /// Drops every registration and clears the exit state.
    pub fn reset(&self) {
        debug!("resetting signal handler");
        let handler = self.id();
        for entry in self.shared.registry.drain() {
            entry.with(|unit| unit.cancel_state().unlink(handler));
            if let Some(id) = entry.id() {
                self.shared
                    .bus
                    .publish(Event::new(EventKind::CancelableRemoved).with_target(id));
            }
        }
        self.shared.exited.store(false, Ordering::Release);
        self.shared
            .return_code
            .store(self.shared.cfg.success_code, Ordering::Release);
    }

    /// Requests listener shutdown and blocks until its thread has exited.
    ///
    /// Idempotent; also called on drop. Must not be called from a unit's
    /// `on_cancel` hook, which runs on the listener thread.
    pub fn join_waiting_thread(&self) {
        let mut slot = self.listener.lock();
        let Some(listener) = slot.take() else {
            return;
        };

        self.shared.set_state(ListenerState::JoinRequested);
        debug!("joining signal listener");
        listener.join();
        self.shared.set_state(ListenerState::Joined);
        debug!("signal listener joined");
    }

    /// Current listener lifecycle state.
    pub fn listener_state(&self) -> ListenerState {
        *self.shared.state.lock()
    }

    /// True if `unit` is registered.
    pub fn contains<C: Cancelable + ?Sized>(&self, unit: &C) -> bool {
        self.contains_id(TargetId::of(unit))
    }

    /// True if an entry with identity `id` is registered (live or not yet pruned).
    pub fn contains_id(&self, id: TargetId) -> bool {
        self.shared.registry.contains(id)
    }

    /// Number of entries, including not-yet-pruned dead ones.
    pub fn len(&self) -> usize {
        self.shared.registry.len()
    }

    /// True if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribes to handler events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// The configuration this handler was built with.
    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    fn id(&self) -> TargetId {
        TargetId::of(&*self.shared)
    }
}

impl Drop for SignalHandler {
    fn drop(&mut self) {
        self.join_waiting_thread();
    }
}

impl fmt::Debug for SignalHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHandler")
            .field("entries", &self.len())
            .field("listener", &self.listener_state())
            .field("exited", &self.got_exit_signal())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::{CancelFlag, CancelState};
    use crate::holder::Exclusive;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Tester {
        state: CancelState,
    }

    impl Cancelable for Tester {
        fn cancel_state(&self) -> &CancelState {
            &self.state
        }
    }

    #[derive(Default)]
    struct TesterDerived {
        base: Tester,
        hook_calls: AtomicUsize,
    }

    impl Cancelable for TesterDerived {
        fn cancel_state(&self) -> &CancelState {
            self.base.cancel_state()
        }

        fn on_cancel(&self, _code: i32) {
            self.hook_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct SecondDerived {
        inner: TesterDerived,
    }

    impl Cancelable for SecondDerived {
        fn cancel_state(&self) -> &CancelState {
            self.inner.cancel_state()
        }

        fn on_cancel(&self, code: i32) {
            self.inner.on_cancel(code);
        }
    }

    static STATIC_UNIT: CancelFlag = CancelFlag::new();

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[test]
    fn test_cancel_all_reaches_every_kind_of_unit() {
        let handler = SignalHandler::new(true).unwrap();
        assert_eq!(handler.listener_state(), ListenerState::Waiting);

        let cancel = Arc::new(CancelFlag::new());
        let cancel_derived = Arc::new(TesterDerived::default());
        let second_derived = Arc::new(SecondDerived::default());
        let unbound: Exclusive<dyn Cancelable> =
            Exclusive::from(Box::new(TesterDerived::default()) as Box<dyn Cancelable>);
        let shared: Arc<dyn Cancelable> = Arc::new(SecondDerived::default());
        let test = Arc::new(Tester::default());
        let test_derived = Arc::new(TesterDerived::default());

        assert!(handler.add_cancelable(&cancel));
        assert!(handler.add_cancelable(&cancel_derived));
        assert!(handler.add_cancelable(&second_derived));
        assert!(handler.add_holder(WeakHolder::from_exclusive(&unbound)));
        assert!(handler.add_holder(WeakHolder::from_shared(&shared)));
        assert!(handler.add_cancelable(&test));
        assert!(handler.add_cancelable(&test_derived));
        assert_eq!(handler.len(), 7);

        assert_eq!(handler.cancel_all(0), 7);

        assert!(cancel.is_canceled());
        assert!(cancel_derived.is_canceled());
        assert!(second_derived.is_canceled());
        assert!(unbound.is_canceled());
        assert!(shared.is_canceled());
        assert!(test.is_canceled());
        assert!(test_derived.is_canceled());
        assert_eq!(second_derived.inner.hook_calls.load(Ordering::SeqCst), 1);
        // dropping the handler joins the listener
    }

    #[test]
    fn test_removed_unit_is_not_canceled() {
        let test = Arc::new(Tester::default());
        assert!(!test.is_canceled());

        let handler = SignalHandler::new(true).unwrap();
        handler.add_cancelable(&test);
        assert!(test.cancel_state().is_registered());
        assert!(handler.remove_cancelable(&*test));
        assert!(!test.cancel_state().is_registered());

        handler.cancel_all(0);
        assert!(!test.is_canceled());

        handler.join_waiting_thread();
        assert_eq!(handler.listener_state(), ListenerState::Joined);
    }

    #[test]
    fn test_duplicate_and_absent_are_noops() {
        let handler = SignalHandler::new(false).unwrap();
        let test = Arc::new(Tester::default());

        assert!(handler.add_cancelable(&test));
        assert!(!handler.add_cancelable(&test));
        let as_base: Arc<dyn Cancelable> = test.clone();
        assert!(!handler.add_holder(WeakHolder::from_shared(&as_base)));
        assert_eq!(handler.len(), 1);

        let other = Tester::default();
        assert!(!handler.remove_cancelable(&other));
        assert!(!handler.add_holder(WeakHolder::new()));
        assert!(handler.remove_cancelable(&*test));
        assert!(!handler.remove_cancelable(&*test));
        assert!(handler.is_empty());
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        struct Recorder {
            state: CancelState,
            tag: usize,
            log: Arc<Mutex<Vec<usize>>>,
        }

        impl Cancelable for Recorder {
            fn cancel_state(&self) -> &CancelState {
                &self.state
            }

            fn on_cancel(&self, _code: i32) {
                self.log.lock().push(self.tag);
            }
        }

        let handler = SignalHandler::new(false).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let units: Vec<_> = (0..5)
            .map(|tag| {
                Arc::new(Recorder {
                    state: CancelState::new(),
                    tag,
                    log: Arc::clone(&log),
                })
            })
            .collect();
        for u in units.iter().rev() {
            handler.add_cancelable(u);
        }

        handler.cancel_all(2);
        assert_eq!(*log.lock(), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_dropped_unit_deregisters_itself() {
        let handler = SignalHandler::new(false).unwrap();
        let mut rx = handler.subscribe();
        let keep = Arc::new(CancelFlag::new());
        let gone = Arc::new(CancelFlag::new());
        let gone_id = TargetId::of(&*gone);

        handler.add_cancelable(&keep);
        handler.add_cancelable(&gone);
        drop(gone);

        assert!(!handler.contains_id(gone_id));
        assert_eq!(handler.cancel_all(0), 1);
        assert!(keep.is_canceled());
        assert_eq!(
            drain(&mut rx),
            vec![
                EventKind::CancelableAdded,
                EventKind::CancelableAdded,
                EventKind::CancelableRemoved,
                EventKind::CancelRequested,
                EventKind::CancelDelivered,
            ]
        );
    }

    #[test]
    fn test_unlinked_dead_entry_is_pruned() {
        let handler = SignalHandler::new(false).unwrap();
        let mut rx = handler.subscribe();
        let unit: Arc<dyn Cancelable> = Arc::new(CancelFlag::new());
        let id = TargetId::of(&*unit);

        handler.add_holder(WeakHolder::from_shared(&unit));
        // break the back-link so the drop cannot deregister
        unit.cancel_state().unlink(handler.id());
        drop(unit);

        assert!(handler.contains_id(id));
        assert_eq!(handler.cancel_all(0), 0);
        assert!(!handler.contains_id(id));
        assert!(drain(&mut rx).contains(&EventKind::EntryPruned));
    }

    #[test]
    fn test_entry_expiring_during_delivery_is_pruned() {
        struct Dropper {
            state: CancelState,
            victim: Mutex<Option<Arc<dyn Cancelable>>>,
        }

        impl Cancelable for Dropper {
            fn cancel_state(&self) -> &CancelState {
                &self.state
            }

            fn on_cancel(&self, _code: i32) {
                drop(self.victim.lock().take());
            }
        }

        let handler = SignalHandler::new(false).unwrap();
        let victim: Arc<dyn Cancelable> = Arc::new(CancelFlag::new());
        let victim_id = TargetId::of(&*victim);
        let dropper = Arc::new(Dropper {
            state: CancelState::new(),
            victim: Mutex::new(Some(Arc::clone(&victim))),
        });

        handler.add_cancelable(&dropper);
        handler.add_holder(WeakHolder::from_shared(&victim));
        // keep the entry in place when the victim is destroyed
        victim.cancel_state().unlink(handler.id());
        drop(victim);

        let mut rx = handler.subscribe();
        assert_eq!(handler.cancel_all(4), 1);
        assert!(dropper.is_canceled());
        assert!(!handler.contains_id(victim_id));
        assert_eq!(
            drain(&mut rx),
            vec![
                EventKind::CancelRequested,
                EventKind::CancelDelivered,
                EventKind::EntryPruned,
            ]
        );
    }

    #[test]
    fn test_static_unit_is_delivered() {
        let handler = SignalHandler::new(false).unwrap();
        let holder: WeakHolder<dyn Cancelable> = WeakHolder::from_static(&STATIC_UNIT);
        assert!(handler.add_holder(holder));
        handler.cancel_all(6);
        assert_eq!(STATIC_UNIT.cancel_code(), 6);
        assert!(handler.remove_cancelable(&STATIC_UNIT));
    }

    #[test]
    fn test_already_canceled_unit_keeps_its_code() {
        let handler = SignalHandler::new(false).unwrap();
        let test = Arc::new(Tester::default());
        handler.add_cancelable(&test);

        test.cancel(9);
        handler.cancel_all(1);
        assert_eq!(test.cancel_code(), 9);

        test.reset_cancel();
        handler.cancel_all(1);
        assert_eq!(test.cancel_code(), 1);
    }

    #[test]
    fn test_exit_and_reset() {
        let handler = SignalHandler::new(false).unwrap();
        let test = Arc::new(Tester::default());
        handler.add_cancelable(&test);
        assert!(!handler.got_exit_signal());
        assert_eq!(handler.return_code(), 0);

        assert_eq!(handler.exit(3), 1);
        assert!(handler.got_exit_signal());
        assert_eq!(handler.return_code(), 3);
        assert_eq!(test.cancel_code(), 3);

        handler.reset();
        assert!(!handler.got_exit_signal());
        assert_eq!(handler.return_code(), 0);
        assert!(handler.is_empty());
        assert!(!test.cancel_state().is_registered());
    }

    #[test]
    fn test_raise_goes_through_listener() {
        let handler = SignalHandler::new(true).unwrap();
        let mut rx = handler.subscribe();
        let test = Arc::new(Tester::default());
        handler.add_cancelable(&test);

        assert!(handler.raise(Trigger::Terminate));

        // the thread exits on its own after one trigger
        let deadline = Instant::now() + Duration::from_secs(5);
        while handler.listener_state() == ListenerState::Waiting && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(handler.listener_state(), ListenerState::JoinRequested);
        assert!(test.is_canceled());

        handler.join_waiting_thread();
        assert_eq!(handler.listener_state(), ListenerState::Joined);
        assert_eq!(test.cancel_code(), 1);
        assert!(handler.got_exit_signal());
        assert_eq!(handler.return_code(), 1);

        let kinds = drain(&mut rx);
        assert!(kinds.contains(&EventKind::TriggerReceived));
        assert!(kinds.contains(&EventKind::ListenerStopped));
    }

    #[test]
    fn test_raise_without_listener_is_handled_inline() {
        let cfg = Config {
            listen: false,
            success_code: 42,
            ..Config::default()
        };
        let handler = SignalHandler::with_config(cfg).unwrap();
        let test = Arc::new(Tester::default());
        handler.add_cancelable(&test);

        assert!(!handler.raise(Trigger::Interrupt));
        assert_eq!(test.cancel_code(), 42);
        assert_eq!(handler.listener_state(), ListenerState::Idle);
    }

    #[test]
    fn test_join_is_idempotent() {
        let handler = SignalHandler::new(true).unwrap();
        handler.join_waiting_thread();
        handler.join_waiting_thread();
        assert_eq!(handler.listener_state(), ListenerState::Joined);
        drop(handler);

        let idle = SignalHandler::new(false).unwrap();
        idle.join_waiting_thread();
        assert_eq!(idle.listener_state(), ListenerState::Idle);
    }

    #[test]
    fn test_units_outlive_handler() {
        let test = Arc::new(Tester::default());
        {
            let handler = SignalHandler::new(true).unwrap();
            handler.add_cancelable(&test);
        }
        assert!(!test.cancel_state().is_registered());
        test.cancel_state().detach();
        test.cancel(0);
        assert!(test.is_canceled());
    }

    #[test]
    fn test_concurrent_registration_and_delivery() {
        let handler = Arc::new(SignalHandler::new(false).unwrap());
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let h = Arc::clone(&handler);
                thread::spawn(move || {
                    let mut units = Vec::new();
                    for _ in 0..50 {
                        let u = Arc::new(Tester::default());
                        h.add_cancelable(&u);
                        units.push(u);
                    }
                    for u in units.iter().step_by(2) {
                        h.remove_cancelable(&**u);
                    }
                    units
                })
            })
            .collect();

        let canceler = {
            let h = Arc::clone(&handler);
            thread::spawn(move || {
                for _ in 0..20 {
                    h.cancel_all(0);
                }
            })
        };

        let units: Vec<_> = workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect();
        canceler.join().unwrap();

        assert_eq!(handler.len(), 100);
        handler.cancel_all(0);
        for u in units.iter().skip(1).step_by(2) {
            assert!(u.is_canceled());
        }
    }

    /// Re-runs a single test of this binary in a child process with `var` set.
    #[cfg(unix)]
    fn run_in_child(test: &str, var: &str) -> std::process::ExitStatus {
        std::process::Command::new(std::env::current_exe().unwrap())
            .args(["--exact", test, "--test-threads=1", "--nocapture"])
            .env(var, "1")
            .status()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_sigint_kills_process_after_handler_drop() {
        use std::os::unix::process::ExitStatusExt;
        use signal_hook::consts::SIGINT;

        const CHILD: &str = "CANCELVISOR_CHILD_SIGINT_AFTER_DROP";
        if std::env::var_os(CHILD).is_some() {
            let handler = SignalHandler::new(true).unwrap();
            thread::sleep(Duration::from_millis(50));
            drop(handler);
            signal_hook::low_level::raise(SIGINT).unwrap();
            thread::sleep(Duration::from_secs(5));
            std::process::exit(0);
        }

        let status = run_in_child(
            "core::handler::tests::test_sigint_kills_process_after_handler_drop",
            CHILD,
        );
        assert_eq!(status.signal(), Some(SIGINT));
    }

    #[cfg(unix)]
    #[test]
    fn test_sigint_right_after_construction_cancels_units() {
        use signal_hook::consts::SIGINT;

        const CHILD: &str = "CANCELVISOR_CHILD_SIGINT_EARLY";
        if std::env::var_os(CHILD).is_some() {
            let handler = SignalHandler::new(true).unwrap();
            let flag = Arc::new(CancelFlag::new());
            handler.add_cancelable(&flag);
            signal_hook::low_level::raise(SIGINT).unwrap();

            let canceled = flag
                .wait(Duration::from_secs(5), Duration::from_millis(5))
                .unwrap();
            let code = if canceled && handler.return_code() == 0 { 0 } else { 3 };
            std::process::exit(code);
        }

        let status = run_in_child(
            "core::handler::tests::test_sigint_right_after_construction_cancels_units",
            CHILD,
        );
        assert_eq!(status.code(), Some(0));
    }
}
