//! # Example: ctrl_c
//!
//! Demonstrates OS-signal driven cancellation of worker threads.
//!
//! Shows how to:
//! - Register shared and exclusively-owned units with a [`SignalHandler`]
//! - Let a worker poll [`Cancelable::is_canceled`] and stop on its own
//! - Read the exit code the trigger mapped to
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► SignalHandler::new(true)  (listener thread waits for SIGINT/SIGTERM/SIGQUIT)
//!   ├─► spawn workers polling their flag
//!   ├─► Ctrl-C
//!   │     └─► listener: exit(success_code) ─► cancel_all ─► each worker stops
//!   └─► join workers, join listener, print return code
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example ctrl_c
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cancelvisor::{CancelFlag, CancelState, Cancelable, Exclusive, SignalHandler, WeakHolder};
use tracing_subscriber::EnvFilter;

/// Worker with its own hook, logging when told to stop.
#[derive(Default)]
struct Reporter {
    state: CancelState,
}

impl Cancelable for Reporter {
    fn cancel_state(&self) -> &CancelState {
        &self.state
    }

    fn on_cancel(&self, code: i32) {
        println!("[reporter] canceled with code {code}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== ctrl_c example ===\n");
    let handler = SignalHandler::new(true)?;

    let flags: Vec<_> = (0..3).map(|_| Arc::new(CancelFlag::new())).collect();
    for flag in &flags {
        handler.add_cancelable(flag);
    }
    let reporter: Exclusive<dyn Cancelable> =
        Exclusive::from(Box::new(Reporter::default()) as Box<dyn Cancelable>);
    handler.add_holder(WeakHolder::from_exclusive(&reporter));

    let workers: Vec<_> = flags
        .iter()
        .enumerate()
        .map(|(i, flag)| {
            let flag = Arc::clone(flag);
            thread::spawn(move || {
                let mut ticks = 0u64;
                while !flag.is_canceled() {
                    ticks += 1;
                    thread::sleep(Duration::from_millis(100));
                }
                println!("[worker-{i}] stopped after {ticks} ticks (code {})", flag.cancel_code());
            })
        })
        .collect();

    println!("Press Ctrl-C to stop {} workers...", workers.len());
    reporter.wait(Duration::from_secs(3600), Duration::from_millis(50))?;

    for w in workers {
        let _ = w.join();
    }
    handler.join_waiting_thread();

    println!(
        "\nexit signal: {}, return code: {}",
        handler.got_exit_signal(),
        handler.return_code()
    );
    Ok(())
}
