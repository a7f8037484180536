//! Non-owning references that survive destruction order.
//!
//! This module provides the reference types the coordinator uses to point at
//! units it does not own:
//! - [`WeakHolder`] - single-assignment weak reference with scoped access
//! - [`Exclusive`] - unique owner whose allocation can still be weakly tracked
//! - [`Origin`] - how the referenced object's lifetime is managed
//! - [`TargetId`] - identity of a referenced object, readable without dereferencing

mod exclusive;
mod weak_holder;

pub use exclusive::Exclusive;
pub use weak_holder::{Origin, TargetId, WeakHolder};
