//! # Cancelable units.
//!
//! This module provides the unit-side half of cancellation:
//! - [`Cancelable`] - trait for units that can be asked to stop
//! - [`CancelState`] - latched flag + code, embedded in every unit
//! - [`CancelFlag`] - ready-made unit with no behavior of its own

mod cancelable;
mod state;

pub use cancelable::{CancelFlag, Cancelable};
pub use state::CancelState;
