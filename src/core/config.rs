//! # Signal handler configuration.
//!
//! Provides [`Config`] centralized settings for a [`SignalHandler`](crate::SignalHandler).
//!
//! Config is used in two ways:
//! 1. **Explicit**: `SignalHandler::with_config(config)`
//! 2. **Shorthand**: `SignalHandler::new(listen)` = default config with `listen` overridden
//!
//! ## Code mapping
//! - `Trigger::Interrupt`, `Trigger::Quit` → `success_code`
//! - `Trigger::Terminate` → `error_code`

use crate::core::Trigger;

/// Configuration for a signal handler.
///
/// ## Field semantics
/// - `listen`: spawn the background listener thread (`false` = explicit calls only)
/// - `success_code`: code delivered for user-initiated stops (Ctrl-C, quit)
/// - `error_code`: code delivered for external termination requests
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `thread_name`: name given to the listener thread
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether to spawn the background listener thread.
    pub listen: bool,

    /// Code delivered on `Trigger::Interrupt` and `Trigger::Quit`.
    pub success_code: i32,

    /// Code delivered on `Trigger::Terminate`.
    pub error_code: i32,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Name of the listener thread (visible in debuggers and panics).
    pub thread_name: String,
}

impl Config {
    /// Returns the code a trigger maps to.
    #[inline]
    pub fn code_for(&self, trigger: Trigger) -> i32 {
        match trigger {
            Trigger::Interrupt | Trigger::Quit => self.success_code,
            Trigger::Terminate => self.error_code,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `listen = true`
    /// - `success_code = 0`
    /// - `error_code = 1`
    /// - `bus_capacity = 256`
    /// - `thread_name = "cancelvisor-listener"`
    fn default() -> Self {
        Self {
            listen: true,
            success_code: 0,
            error_code: 1,
            bus_capacity: 256,
            thread_name: "cancelvisor-listener".to_string(),
        }
    }
}
