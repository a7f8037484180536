//! # Background signal listener.
//!
//! One dedicated thread per handler drives a current-thread tokio runtime that
//! waits for the first of:
//! - an OS termination signal ([`SignalSource`], registered before `spawn` returns);
//! - an in-process [`Trigger`] sent through [`Listener::send`];
//! - a shutdown request (the handler's `CancellationToken`).
//!
//! ```text
//!  SignalHandler::new(listen = true)
//!        └─► Listener::spawn ──► thread "cancelvisor-listener"
//!                                   └─► block_on(listen)
//!                                          select! {
//!                                            triggers.recv() ─► Shared::on_trigger ─► cancel_all
//!                                            OS signal       ─► Shared::on_trigger ─► cancel_all
//!                                            token.cancelled ─► exit quietly
//!                                          }
//!  SignalHandler::join_waiting_thread / Drop
//!        └─► token.cancel() ─► thread.join()
//! ```
//!
//! The thread handles at most one trigger, then exits and leaves the state at
//! `JoinRequested` until the handle is joined. Its signal registration is
//! dropped as soon as the wait ends, so later signals get the process default.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::Shared;
use crate::core::shutdown::{SignalSource, Trigger};
use crate::error::RuntimeError;
use crate::events::{Event, EventKind};

/// Lifecycle of a handler's listener thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No listener running (not spawned, or spawning failed).
    Idle,
    /// Listener thread is running and waiting for a trigger.
    Waiting,
    /// Shutdown requested (join in progress, or the thread handled its
    /// trigger and is waiting to be joined).
    JoinRequested,
    /// Listener thread has been joined.
    Joined,
}

/// Handle to the listener thread.
pub(crate) struct Listener {
    token: CancellationToken,
    triggers: mpsc::UnboundedSender<Trigger>,
    thread: JoinHandle<()>,
}

impl Listener {
    /// Builds the runtime, registers the OS signals and starts the listener thread.
    pub(crate) fn spawn(shared: Arc<Shared>) -> Result<Self, RuntimeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let signals = SignalSource::register()?;

        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let name = shared.cfg.thread_name.clone();

        shared.set_state(ListenerState::Waiting);
        let worker = Arc::clone(&shared);
        let child = token.clone();
        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || runtime.block_on(listen(worker, signals, rx, child)))
            .inspect_err(|_| shared.set_state(ListenerState::Idle))?;

        Ok(Self {
            token,
            triggers: tx,
            thread,
        })
    }

    /// Hands a trigger to the listener. Returns `false` if it already exited.
    pub(crate) fn send(&self, trigger: Trigger) -> bool {
        self.triggers.send(trigger).is_ok()
    }

    /// Requests shutdown and blocks until the thread exits.
    pub(crate) fn join(self) {
        self.token.cancel();
        if self.thread.join().is_err() {
            warn!("signal listener thread panicked");
        }
    }
}

async fn listen(
    shared: Arc<Shared>,
    signals: SignalSource,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
    token: CancellationToken,
) {
    info!("signal listener waiting for a trigger");
    shared.bus.publish(Event::new(EventKind::ListenerStarted));

    let signal = async move {
        match signals.recv().await {
            Ok(trigger) => trigger,
            Err(e) => {
                warn!(error = %e, "unable to watch OS signals; only in-process triggers will be observed");
                std::future::pending::<Trigger>().await
            }
        }
    };

    // triggers first: one raised before a join must still be handled
    let observed = tokio::select! {
        biased;
        trigger = triggers.recv() => trigger,
        trigger = signal => Some(trigger),
        _ = token.cancelled() => None,
    };

    let reason = match observed {
        Some(trigger) => {
            shared.on_trigger(trigger);
            shared.set_state(ListenerState::JoinRequested);
            "triggered"
        }
        None => "join_requested",
    };

    debug!(reason, "signal listener exiting");
    shared
        .bus
        .publish(Event::new(EventKind::ListenerStopped).with_reason(reason));
}
