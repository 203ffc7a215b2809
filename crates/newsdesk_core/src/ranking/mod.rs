//! Storage-free ranking algorithm.
//!
//! # Responsibility
//! - Compute the next slot state for assign/auto-assign/remove.
//! - Turn a state transition into an ordered sequence of row writes that a
//!   store with a unique `(list_kind, rank)` constraint can execute.
//!
//! # Invariants
//! - Occupied ranks are always `1..=len` (no gaps, no duplicates).
//! - `len <= capacity` for every produced state.
//! - Computing a transition never mutates the source state.

mod plan;
mod slots;

pub use plan::{plan_slot_writes, SlotWrite};
pub use slots::{RankedSlots, SlotError, SlotOutcome};
