//! Error types used by the cancelvisor holders, units and handler.
//!
//! This module defines three error enums:
//!
//! - [`WeakHolderError`]: misuse of a [`WeakHolder`](crate::WeakHolder) (re-loading).
//! - [`CancelError`]: invalid arguments to blocking cancelable helpers.
//! - [`RuntimeError`]: failures raised while starting the listener machinery.
//!
//! Everything else in the crate (stale references, duplicate registration,
//! double joins) is handled locally and turned into `bool`/`Option`/no-op
//! outcomes, so these enums stay small.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by [`WeakHolder`](crate::WeakHolder).
///
/// A holder is single-assignment: once loaded it tracks the same target for
/// its whole life. Loading it again is the only hard failure in the holder API.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakHolderError {
    /// The holder already references a target.
    #[error("weak holder is already loaded")]
    AlreadyLoaded,
}

impl WeakHolderError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cancelvisor::WeakHolderError;
    ///
    /// assert_eq!(WeakHolderError::AlreadyLoaded.as_label(), "holder_already_loaded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WeakHolderError::AlreadyLoaded => "holder_already_loaded",
        }
    }
}

/// # Errors produced by cancelable helpers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelError {
    /// The polling interval passed to [`Cancelable::wait`](crate::Cancelable::wait)
    /// is longer than the total wait.
    #[error("check interval {check:?} should not exceed the wait time {wait:?}")]
    CheckExceedsWait {
        /// The total time to wait.
        wait: Duration,
        /// The requested polling interval.
        check: Duration,
    },
}

impl CancelError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CancelError::CheckExceedsWait { .. } => "cancel_check_exceeds_wait",
        }
    }
}

/// # Errors produced by the signal handler runtime.
///
/// These represent failures to bring up the background listener, which is the
/// only part of [`SignalHandler`](crate::SignalHandler) that touches the OS.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The listener thread (or the runtime it drives) could not be created.
    #[error("failed to spawn signal listener: {source}")]
    ListenerSpawn {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cancelvisor::RuntimeError;
    ///
    /// let err = RuntimeError::from(std::io::Error::other("no threads"));
    /// assert_eq!(err.as_label(), "runtime_listener_spawn");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ListenerSpawn { .. } => "runtime_listener_spawn",
        }
    }
}
