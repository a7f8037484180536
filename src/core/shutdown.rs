//! # Cross-platform OS signal handling.
//!
//! Provides [`Trigger`] and [`SignalSource`], a registration of the process's
//! termination signals that completes with the kind of signal received.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal) → [`Trigger::Interrupt`]
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes) → [`Trigger::Terminate`]
//! - `SIGQUIT` (quit signal, Ctrl-\\) → [`Trigger::Quit`]
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`] → [`Trigger::Interrupt`]
//!
//! ## Rules (unix)
//! - Registration is synchronous: once [`SignalSource::register`] returns, a
//!   signal is recorded even if nobody is polling yet.
//! - Dropping a source unregisters its actions.
//! - While no source is alive, the signals get their default action (the
//!   process terminates), as if no handler had ever been installed.
//!
//! ```text
//!  signal ─► registry handler ─┬─► fallback action: LIVE == 0 ? default action
//!                              └─► per-source: slot = signo; write 1 byte to wake pipe
//!                                                    │
//!  SignalSource::recv ◄── readable ──────────────────┘
//! ```

use std::fmt;

/// External request to cancel everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Interactive interrupt (SIGINT / Ctrl-C).
    Interrupt,
    /// Termination request (SIGTERM).
    Terminate,
    /// Quit request (SIGQUIT).
    Quit,
}

impl Trigger {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Trigger::Interrupt => "interrupt",
            Trigger::Terminate => "terminate",
            Trigger::Quit => "quit",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(unix)]
pub(crate) use unix::SignalSource;

#[cfg(not(unix))]
pub(crate) use other::SignalSource;

#[cfg(unix)]
mod unix {
    use std::io::{self, ErrorKind};
    use std::os::unix::net::UnixStream as StdUnixStream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use signal_hook::SigId;
    use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::{flag, low_level};
    use tokio::net::UnixStream;

    use super::Trigger;

    const SIGNALS: [i32; 3] = [SIGINT, SIGTERM, SIGQUIT];

    /// Number of live sources in the process.
    static LIVE: AtomicUsize = AtomicUsize::new(0);
    static FALLBACK_INSTALLED: Mutex<bool> = parking_lot::const_mutex(false);

    /// Installs, once per process, the action that restores the default
    /// disposition while no source is alive.
    fn install_fallback() -> io::Result<()> {
        let mut installed = FALLBACK_INSTALLED.lock();
        if *installed {
            return Ok(());
        }
        for signal in SIGNALS {
            // SAFETY: the action only loads an atomic and calls
            // `emulate_default_handler`, the same pair signal-hook's own
            // `register_conditional_default` runs inside the handler.
            unsafe {
                low_level::register(signal, move || {
                    if LIVE.load(Ordering::SeqCst) == 0 {
                        let _ = low_level::emulate_default_handler(signal);
                    }
                })
            }?;
        }
        *installed = true;
        Ok(())
    }

    fn trigger_of(signal: usize) -> Option<Trigger> {
        match i32::try_from(signal).ok()? {
            SIGINT => Some(Trigger::Interrupt),
            SIGTERM => Some(Trigger::Terminate),
            SIGQUIT => Some(Trigger::Quit),
            _ => None,
        }
    }

    /// Registered interest in the termination signals.
    pub(crate) struct SignalSource {
        ids: Vec<SigId>,
        slot: Arc<AtomicUsize>,
        wake: Option<StdUnixStream>,
    }

    impl SignalSource {
        /// Registers SIGINT, SIGTERM and SIGQUIT for this source.
        pub(crate) fn register() -> io::Result<Self> {
            install_fallback()?;

            let (wake, writer) = StdUnixStream::pair()?;
            wake.set_nonblocking(true)?;
            writer.set_nonblocking(true)?;

            LIVE.fetch_add(1, Ordering::SeqCst);
            let mut source = Self {
                ids: Vec::with_capacity(SIGNALS.len() * 2),
                slot: Arc::new(AtomicUsize::new(0)),
                wake: Some(wake),
            };
            for signal in SIGNALS {
                // slot first: actions run in registration order
                let value = usize::try_from(signal).unwrap_or_default();
                source
                    .ids
                    .push(flag::register_usize(signal, Arc::clone(&source.slot), value)?);
                source
                    .ids
                    .push(low_level::pipe::register(signal, writer.try_clone()?)?);
            }
            Ok(source)
        }

        /// Completes with the first signal received after registration.
        ///
        /// Must be polled inside a tokio runtime with I/O enabled.
        pub(crate) async fn recv(mut self) -> io::Result<Trigger> {
            let wake = self
                .wake
                .take()
                .ok_or_else(|| io::Error::from(ErrorKind::NotConnected))?;
            let wake = UnixStream::from_std(wake)?;

            let mut buf = [0u8; 16];
            loop {
                wake.readable().await?;
                match wake.try_read(&mut buf) {
                    Ok(0) => return Err(ErrorKind::UnexpectedEof.into()),
                    Ok(_) => {
                        if let Some(trigger) = trigger_of(self.slot.swap(0, Ordering::SeqCst)) {
                            return Ok(trigger);
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    impl Drop for SignalSource {
        fn drop(&mut self) {
            for id in self.ids.drain(..) {
                low_level::unregister(id);
            }
            LIVE.fetch_sub(1, Ordering::SeqCst);
        }
    }

}

#[cfg(not(unix))]
mod other {
    use std::io;

    use super::Trigger;

    /// Registered interest in Ctrl-C.
    pub(crate) struct SignalSource;

    impl SignalSource {
        pub(crate) fn register() -> io::Result<Self> {
            Ok(Self)
        }

        /// Completes with the first Ctrl-C.
        pub(crate) async fn recv(self) -> io::Result<Trigger> {
            tokio::signal::ctrl_c().await?;
            Ok(Trigger::Interrupt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Trigger::Interrupt.to_string(), "interrupt");
        assert_eq!(Trigger::Terminate.as_label(), "terminate");
        assert_eq!(Trigger::Quit.as_label(), "quit");
    }
}
