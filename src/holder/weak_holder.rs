//! # WeakHolder: a non-owning reference with scoped access.
//!
//! [`WeakHolder`] references an object of capability `T` (usually a trait object
//! such as `dyn Cancelable`) without extending its lifetime. It works uniformly
//! for the three ways an object can be owned elsewhere:
//!
//! | Origin                   | Loaded from           | Expires when                   |
//! |--------------------------|-----------------------|--------------------------------|
//! | [`Origin::Shared`]       | `&Arc<T>`             | the last `Arc` is dropped      |
//! | [`Origin::Exclusive`]    | `&Exclusive<T>`       | the `Exclusive` is dropped     |
//! | [`Origin::Unmanaged`]    | `&'static T`          | never                          |
//!
//! ## Liveness
//! Liveness is read from the owning record created when the object was
//! constructed (its `Arc` allocation), not from a record typed at the holder's
//! capability. Upcasting `Arc<Worker>` to `Arc<dyn Cancelable>` shares that
//! record, so a holder typed at the base capability keeps seeing the concrete
//! object alive.
//!
//! A holder built from a `Weak` that was never attached to an allocation has
//! no owning record to consult and is permanently expired. That is the
//! supported degradation for targets whose real owner cannot be located; the
//! holder never guesses.
//!
//! ## Rules
//! - Single assignment: `load_*` on a loaded holder returns
//!   [`WeakHolderError::AlreadyLoaded`].
//! - [`WeakHolder::with`] promotes to a strong reference for the duration of the
//!   closure only; the target cannot be destroyed while the closure runs.
//! - [`WeakHolder::id`] never dereferences the target, so it is valid after expiry.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use cancelvisor::WeakHolder;
//!
//! let value = Arc::new(100);
//! let mut holder: WeakHolder<i32> = WeakHolder::new();
//! assert_eq!(holder.with_or(-999, |v| *v), -999);
//!
//! holder.load_shared(&value).unwrap();
//! assert_eq!(holder.with_or(-999, |v| *v), 100);
//!
//! drop(value);
//! assert!(holder.expired());
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::WeakHolderError;
use crate::holder::Exclusive;

/// How the referenced object's lifetime is managed by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Owned by exactly one [`Exclusive`].
    Exclusive,
    /// Owned by one or more `Arc`s.
    Shared,
    /// Lives outside any ownership record (static storage).
    Unmanaged,
}

/// Identity of a referenced object.
///
/// Derived from the address of the object's data. A holder's weak reference
/// keeps the allocation reserved, so an id cannot be reused by another object
/// while any holder carrying it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// Returns the identity of `target`.
    #[inline]
    pub fn of<T: ?Sized>(target: &T) -> Self {
        Self::from_ptr(target as *const T)
    }

    #[inline]
    fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.cast::<()>() as usize)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

enum Target<T: ?Sized + 'static> {
    Owned(Weak<T>),
    Static(&'static T),
}

impl<T: ?Sized + 'static> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Owned(weak) => Target::Owned(weak.clone()),
            Target::Static(target) => Target::Static(*target),
        }
    }
}

struct Slot<T: ?Sized + 'static> {
    target: Target<T>,
    origin: Origin,
    id: TargetId,
}

impl<T: ?Sized + 'static> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            origin: self.origin,
            id: self.id,
        }
    }
}

/// Single-assignment, non-owning reference to an object of capability `T`.
///
/// Cloning a holder yields another holder for the same target.
pub struct WeakHolder<T: ?Sized + 'static> {
    slot: Option<Slot<T>>,
}

impl<T: ?Sized + 'static> WeakHolder<T> {
    /// Creates an empty holder. Empty holders are always expired.
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Creates a holder tracking a shared object.
    pub fn from_shared(target: &Arc<T>) -> Self {
        Self::from_slot(Arc::downgrade(target), Origin::Shared)
    }

    /// Creates a holder tracking an exclusively-owned object.
    pub fn from_exclusive(target: &Exclusive<T>) -> Self {
        Self::from_slot(target.downgrade(), Origin::Exclusive)
    }

    /// Creates a holder for an object in static storage. It never expires.
    pub fn from_static(target: &'static T) -> Self {
        Self {
            slot: Some(Slot {
                target: Target::Static(target),
                origin: Origin::Unmanaged,
                id: TargetId::of(target),
            }),
        }
    }

    /// Creates a holder from an existing weak reference.
    ///
    /// The origin is recorded as [`Origin::Shared`]. A `Weak` with no backing
    /// allocation (e.g. `Weak::new()`) yields a permanently expired holder.
    pub fn from_weak(weak: Weak<T>) -> Self {
        Self::from_slot(weak, Origin::Shared)
    }

    fn from_slot(weak: Weak<T>, origin: Origin) -> Self {
        let id = TargetId::from_ptr(weak.as_ptr());
        Self {
            slot: Some(Slot {
                target: Target::Owned(weak),
                origin,
                id,
            }),
        }
    }

    /// Loads a shared object into an empty holder.
    pub fn load_shared(&mut self, target: &Arc<T>) -> Result<(), WeakHolderError> {
        self.load(Self::from_shared(target))
    }

    /// Loads an exclusively-owned object into an empty holder.
    pub fn load_exclusive(&mut self, target: &Exclusive<T>) -> Result<(), WeakHolderError> {
        self.load(Self::from_exclusive(target))
    }

    /// Loads a static object into an empty holder.
    pub fn load_unmanaged(&mut self, target: &'static T) -> Result<(), WeakHolderError> {
        self.load(Self::from_static(target))
    }

    fn load(&mut self, loaded: Self) -> Result<(), WeakHolderError> {
        if self.slot.is_some() {
            return Err(WeakHolderError::AlreadyLoaded);
        }
        self.slot = loaded.slot;
        Ok(())
    }

    /// Returns true if the holder was never loaded or its target was destroyed.
    pub fn expired(&self) -> bool {
        match &self.slot {
            None => true,
            Some(slot) => match &slot.target {
                Target::Owned(weak) => weak.strong_count() == 0,
                Target::Static(_) => false,
            },
        }
    }

    /// Returns true if the holder has been loaded (whether or not the target is alive).
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns how the target's lifetime is managed, if loaded.
    #[inline]
    pub fn origin(&self) -> Option<Origin> {
        self.slot.as_ref().map(|s| s.origin)
    }

    /// Returns the target's identity, if loaded. Valid even after expiry.
    #[inline]
    pub fn id(&self) -> Option<TargetId> {
        self.slot.as_ref().map(|s| s.id)
    }

    /// Promotes to a strong reference.
    ///
    /// Returns `None` if expired, and also for [`Origin::Unmanaged`] targets,
    /// which have no `Arc` to hand out; use [`WeakHolder::with`] for those.
    pub fn upgrade(&self) -> Option<Arc<T>> {
        match &self.slot.as_ref()?.target {
            Target::Owned(weak) => weak.upgrade(),
            Target::Static(_) => None,
        }
    }

    /// Runs `f` with a live reference to the target.
    ///
    /// The target is held strongly for the duration of `f` and released right
    /// after. Returns `None` without calling `f` if the holder is expired.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &self.slot.as_ref()?.target {
            Target::Owned(weak) => {
                let strong = weak.upgrade()?;
                Some(f(&*strong))
            }
            Target::Static(target) => Some(f(*target)),
        }
    }

    /// Runs `f` with a live reference, or returns `fallback` if expired.
    pub fn with_or<R>(&self, fallback: R, f: impl FnOnce(&T) -> R) -> R {
        self.with(f).unwrap_or(fallback)
    }

    /// Runs `f` with a live reference, or `fallback` if expired.
    pub fn with_or_else<R>(&self, fallback: impl FnOnce() -> R, f: impl FnOnce(&T) -> R) -> R {
        self.with(f).unwrap_or_else(fallback)
    }
}

impl<T: ?Sized + 'static> Default for WeakHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Clone for WeakHolder<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for WeakHolder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHolder")
            .field("id", &self.id())
            .field("origin", &self.origin())
            .field("expired", &self.expired())
            .finish()
    }
}
