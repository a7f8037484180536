//! # Exclusive ownership with a trackable allocation.
//!
//! A `Box<T>` has no owning record a weak reference could observe, so a unit
//! owned by exactly one place would be invisible to [`WeakHolder`]. [`Exclusive`]
//! is the unique-owner counterpart: it cannot be cloned, dropping it destroys the
//! value, and weak holders loaded from it expire at that moment.
//!
//! ```rust
//! use cancelvisor::{Cancelable, CancelFlag, Exclusive, WeakHolder};
//!
//! let unit: Exclusive<dyn Cancelable> = Exclusive::from(Box::new(CancelFlag::new()) as Box<dyn Cancelable>);
//! let holder = WeakHolder::from_exclusive(&unit);
//! assert!(!holder.expired());
//!
//! drop(unit);
//! assert!(holder.expired());
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

/// Unique owner of a value whose liveness can be observed by [`WeakHolder`](super::WeakHolder).
///
/// The value is only reachable through shared references (`Deref`), so units
/// stored here keep their mutable state behind interior mutability, as
/// [`CancelState`](crate::CancelState) does.
pub struct Exclusive<T: ?Sized> {
    inner: Arc<T>,
}

impl<T> Exclusive<T> {
    /// Takes ownership of `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl<T: ?Sized> Exclusive<T> {
    /// Moves a boxed (possibly unsized) value into exclusive ownership.
    ///
    /// Use this to store a unit behind its capability only, e.g.
    /// `Box<Worker>` coerced to `Box<dyn Cancelable>`.
    pub fn from_box(value: Box<T>) -> Self {
        Self {
            inner: Arc::from(value),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<T> {
        Arc::downgrade(&self.inner)
    }
}

impl<T: ?Sized> From<Box<T>> for Exclusive<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T: ?Sized> Deref for Exclusive<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Exclusive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Exclusive").field(&&*self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::WeakHolder;

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Alpha;

    impl Named for Alpha {
        fn name(&self) -> &'static str {
            "alpha"
        }
    }

    #[test]
    fn test_deref_reaches_value() {
        let owned = Exclusive::new(41_u32);
        assert_eq!(*owned + 1, 42);
    }

    #[test]
    fn test_boxed_capability_is_tracked() {
        let owned: Exclusive<dyn Named> = Exclusive::from(Box::new(Alpha) as Box<dyn Named>);
        let holder = WeakHolder::from_exclusive(&owned);

        assert_eq!(holder.with(|n| n.name()), Some("alpha"));
        drop(owned);
        assert!(holder.expired());
        assert_eq!(holder.with(|n| n.name()), None);
    }
}
