//! # Cancelable capability and a ready-made flag unit.
//!
//! This module defines the [`Cancelable`] trait (latch-once, resettable
//! cancellation) and [`CancelFlag`], the smallest unit implementing it.
//!
//! A unit embeds a [`CancelState`] and exposes it through
//! [`Cancelable::cancel_state`]; every other method has a default built on that
//! state. Units customize behavior through the [`Cancelable::on_cancel`] and
//! [`Cancelable::on_reset`] hooks instead of re-implementing the latch.
//!
//! # Example
//! ```
//! use cancelvisor::{CancelState, Cancelable};
//!
//! #[derive(Default)]
//! struct Worker {
//!     state: CancelState,
//! }
//!
//! impl Cancelable for Worker {
//!     fn cancel_state(&self) -> &CancelState {
//!         &self.state
//!     }
//! }
//!
//! let worker = Worker::default();
//! assert!(!worker.is_canceled());
//! worker.cancel(0);
//! assert!(worker.is_canceled());
//! worker.reset_cancel();
//! assert!(!worker.is_canceled());
//! ```

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cancel::CancelState;
use crate::error::CancelError;

/// # A unit that can be asked to stop.
///
/// ### Contract
/// - [`cancel`](Cancelable::cancel) is idempotent: the first code latched wins and
///   [`on_cancel`](Cancelable::on_cancel) runs once per cancellation.
/// - [`reset_cancel`](Cancelable::reset_cancel) must not race a `cancel`; callers
///   reset only once the unit is quiescent.
/// - Constructing a unit never registers it with a handler.
pub trait Cancelable: Send + Sync {
    /// The state backing this unit.
    fn cancel_state(&self) -> &CancelState;

    /// Called once, by the thread whose `cancel` latched the code.
    fn on_cancel(&self, code: i32) {
        debug!(code, "cancelable canceled");
    }

    /// Called by `reset_cancel` when the unit was canceled.
    fn on_reset(&self) {}

    /// Latches `code` and runs [`on_cancel`](Cancelable::on_cancel). No-op if already canceled.
    fn cancel(&self, code: i32) {
        if self.cancel_state().latch(code) {
            self.on_cancel(code);
        }
    }

    /// Returns to the uncanceled state (code reverts to 0).
    fn reset_cancel(&self) {
        if self.cancel_state().clear() {
            self.on_reset();
        }
    }

    /// Point-in-time read of the canceled flag.
    fn is_canceled(&self) -> bool {
        self.cancel_state().is_canceled()
    }

    /// The latched code, or 0 when not canceled.
    fn cancel_code(&self) -> i32 {
        self.cancel_state().code().unwrap_or(0)
    }

    /// Blocks until canceled or until `wait` elapses, polling every `check`.
    ///
    /// Returns whether the unit was canceled. A `wait` too large to add to the
    /// current instant (e.g. `Duration::MAX`) waits for cancellation only.
    ///
    /// # Errors
    /// [`CancelError::CheckExceedsWait`] if `check > wait`.
    fn wait(&self, wait: Duration, check: Duration) -> Result<bool, CancelError> {
        if check > wait {
            return Err(CancelError::CheckExceedsWait { wait, check });
        }

        // `None`: the wait is too long to represent, so only cancellation ends it
        let deadline = Instant::now().checked_add(wait);
        while !self.is_canceled() {
            let nap = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        break;
                    }
                    check.min(left)
                }
                None => check,
            };
            thread::sleep(nap);
        }

        let canceled = self.is_canceled();
        if canceled {
            debug!("cancelable wait was canceled");
        } else {
            debug!(?wait, "cancelable wait completed wait time");
        }
        Ok(canceled)
    }
}

/// Minimal [`Cancelable`]: just a flag and a code.
///
/// Useful as a shared stop signal for loops that poll
/// [`is_canceled`](Cancelable::is_canceled).
#[derive(Debug, Default)]
pub struct CancelFlag {
    state: CancelState,
}

impl CancelFlag {
    /// Creates an uncanceled flag.
    pub const fn new() -> Self {
        Self {
            state: CancelState::new(),
        }
    }
}

impl Cancelable for CancelFlag {
    fn cancel_state(&self) -> &CancelState {
        &self.state
    }
}
