//! # Latched cancellation state.
//!
//! [`CancelState`] packs the canceled flag and the cancel code into one
//! `AtomicU64`, so latching is a single compare-exchange:
//!
//! ```text
//!  63          33   32   31                 0
//! ┌──────────────┬──────┬────────────────────┐
//! │   unused     │ flag │  code (i32 bits)   │
//! └──────────────┴──────┴────────────────────┘
//! 0               → not canceled
//! FLAG | code     → canceled with `code`
//! ```
//!
//! It also keeps the link back to the handler the unit is registered with,
//! which is what makes deregistration on drop possible.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::core::Shared;
use crate::holder::{TargetId, WeakHolder};

const CANCELED: u64 = 1 << 32;

#[inline]
fn encode(code: i32) -> u64 {
    CANCELED | u64::from(code as u32)
}

#[inline]
fn decode(raw: u64) -> Option<i32> {
    (raw & CANCELED != 0).then_some(raw as u32 as i32)
}

/// Back-reference to the handler a unit is registered with.
struct Link {
    handler: WeakHolder<Shared>,
    id: TargetId,
}

/// Cancellation flag plus latched code, embeddable in any unit.
///
/// ### Rules
/// - The first `latch` wins; later ones leave the code untouched until `clear`.
/// - Dropping the state deregisters the owning unit from its handler.
pub struct CancelState {
    raw: AtomicU64,
    link: Mutex<Option<Link>>,
}

impl CancelState {
    /// Creates an uncanceled, unregistered state.
    ///
    /// `const`, so units can live in statics.
    pub const fn new() -> Self {
        Self {
            raw: AtomicU64::new(0),
            link: parking_lot::const_mutex(None),
        }
    }

    /// Latches `code` if not already canceled.
    ///
    /// Returns `true` only for the call that performed the transition.
    #[inline]
    pub fn latch(&self, code: i32) -> bool {
        self.raw
            .compare_exchange(0, encode(code), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clears the flag and code. Returns `true` if the state was canceled.
    #[inline]
    pub fn clear(&self) -> bool {
        self.raw.swap(0, Ordering::AcqRel) != 0
    }

    /// Point-in-time read of the flag.
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.raw.load(Ordering::Acquire) & CANCELED != 0
    }

    /// The latched code, or `None` when not canceled.
    #[inline]
    pub fn code(&self) -> Option<i32> {
        decode(self.raw.load(Ordering::Acquire))
    }

    /// True while the owning unit is linked to a live handler.
    pub fn is_registered(&self) -> bool {
        self.link
            .lock()
            .as_ref()
            .is_some_and(|link| !link.handler.expired())
    }

    /// Deregisters the owning unit from the handler it is linked to, if any.
    pub fn detach(&self) {
        let link = self.link.lock().take();
        if let Some(link) = link {
            debug!(target_id = %link.id, "detaching cancelable from handler");
            link.handler.with(|shared| shared.forget(link.id));
        }
    }

    pub(crate) fn attach(&self, handler: &Arc<Shared>, id: TargetId) {
        *self.link.lock() = Some(Link {
            handler: WeakHolder::from_shared(handler),
            id,
        });
    }

    /// Clears the link only if it points at `handler`.
    pub(crate) fn unlink(&self, handler: TargetId) {
        let mut link = self.link.lock();
        if link.as_ref().and_then(|l| l.handler.id()) == Some(handler) {
            *link = None;
        }
    }
}

impl Default for CancelState {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelState {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for CancelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelState")
            .field("canceled", &self.is_canceled())
            .field("code", &self.code())
            .field("registered", &self.is_registered())
            .finish()
    }
}
