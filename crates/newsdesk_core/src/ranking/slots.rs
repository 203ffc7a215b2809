//! In-memory slot array for one ranked list.
//!
//! # Responsibility
//! - Own the ordered members of one `ListKind`.
//! - Produce the successor state of every ranking operation.
//!
//! # Invariants
//! - Index `i` of `slots` holds the item at rank `i + 1`.
//! - An item appears at most once.
//! - `slots.len() <= kind.capacity()`.

use crate::model::content::ItemId;
use crate::model::ranking::{ListKind, Rank, RankedEntry};
use std::collections::HashSet;
use thiserror::Error;

/// Failures of the pure slot algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("rank {rank} is outside 1..={capacity} for {kind}")]
    InvalidRank {
        kind: ListKind,
        rank: Rank,
        capacity: Rank,
    },
    #[error("ranking for {kind} is not contiguous: {reason}")]
    Corrupt { kind: ListKind, reason: String },
}

/// Result of one slot transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOutcome {
    /// Rank held by the target item afterwards.
    pub rank: Rank,
    /// Member pushed past capacity by this transition.
    pub evicted: Option<ItemId>,
    /// Whether the slot state differs from the source state.
    pub changed: bool,
}

/// Ordered, gap-free members of one ranked list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSlots {
    kind: ListKind,
    slots: Vec<ItemId>,
}

impl RankedSlots {
    /// Creates an empty list.
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            slots: Vec::with_capacity(kind.capacity() as usize),
        }
    }

    /// Rebuilds a list from persisted members ordered by ascending rank.
    ///
    /// # Errors
    /// - `SlotError::Corrupt` when ranks are not exactly `1..=len`, an item
    ///   repeats, or the member count exceeds capacity.
    pub fn from_members(kind: ListKind, members: &[RankedEntry]) -> Result<Self, SlotError> {
        let corrupt = |reason: String| SlotError::Corrupt { kind, reason };

        if members.len() > kind.capacity() as usize {
            return Err(corrupt(format!(
                "{} members exceed capacity {}",
                members.len(),
                kind.capacity()
            )));
        }

        let mut seen = HashSet::with_capacity(members.len());
        let mut slots = Vec::with_capacity(kind.capacity() as usize);
        for (index, entry) in members.iter().enumerate() {
            let expected = index as Rank + 1;
            if entry.rank != expected {
                return Err(corrupt(format!(
                    "expected rank {expected}, found {} for item {}",
                    entry.rank, entry.item_id
                )));
            }
            if !seen.insert(entry.item_id) {
                return Err(corrupt(format!("item {} ranked twice", entry.item_id)));
            }
            slots.push(entry.item_id);
        }

        Ok(Self { kind, slots })
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn capacity(&self) -> Rank {
        self.kind.capacity()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity() as usize
    }

    /// Current rank of `item_id`, if it is a member.
    pub fn rank_of(&self, item_id: ItemId) -> Option<Rank> {
        self.slots
            .iter()
            .position(|id| *id == item_id)
            .map(|index| index as Rank + 1)
    }

    /// Item holding `rank`, if occupied.
    pub fn item_at(&self, rank: Rank) -> Option<ItemId> {
        let index = rank.checked_sub(1)? as usize;
        self.slots.get(index).copied()
    }

    /// Members ordered by ascending rank.
    pub fn entries(&self) -> Vec<RankedEntry> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, item_id)| RankedEntry {
                item_id: *item_id,
                rank: index as Rank + 1,
            })
            .collect()
    }

    /// Places `item_id` at `requested` and shifts later members down.
    ///
    /// A current member is first taken out of its old slot, so moving an
    /// item behaves as remove-then-insert. A request past the end of the
    /// occupied run lands on the first free rank, which keeps the list
    /// gap-free. When the list overflows, the member pushed past capacity
    /// is evicted.
    ///
    /// # Errors
    /// - `SlotError::InvalidRank` when `requested` is outside `1..=capacity`.
    pub fn assign(
        &self,
        item_id: ItemId,
        requested: Rank,
    ) -> Result<(Self, SlotOutcome), SlotError> {
        let capacity = self.capacity();
        if requested == 0 || requested > capacity {
            return Err(SlotError::InvalidRank {
                kind: self.kind,
                rank: requested,
                capacity,
            });
        }

        let mut next = self.clone();
        next.slots.retain(|id| *id != item_id);
        let index = (requested as usize - 1).min(next.slots.len());
        next.slots.insert(index, item_id);

        let evicted = if next.slots.len() > capacity as usize {
            next.slots.pop()
        } else {
            None
        };

        let outcome = SlotOutcome {
            rank: index as Rank + 1,
            evicted,
            changed: next != *self,
        };
        Ok((next, outcome))
    }

    /// Appends `item_id` at the lowest free rank.
    ///
    /// Members are left where they are. On a full list the holder of the
    /// last rank is evicted and `item_id` takes its slot.
    pub fn auto_assign(&self, item_id: ItemId) -> (Self, SlotOutcome) {
        if let Some(rank) = self.rank_of(item_id) {
            let outcome = SlotOutcome {
                rank,
                evicted: None,
                changed: false,
            };
            return (self.clone(), outcome);
        }

        let mut next = self.clone();
        let evicted = if next.is_full() { next.slots.pop() } else { None };
        next.slots.push(item_id);

        let outcome = SlotOutcome {
            rank: next.slots.len() as Rank,
            evicted,
            changed: true,
        };
        (next, outcome)
    }

    /// Drops `item_id` and closes the gap it leaves behind.
    ///
    /// Returns the vacated rank, or `None` when `item_id` was not a member.
    pub fn remove(&self, item_id: ItemId) -> (Self, Option<Rank>) {
        let vacated = self.rank_of(item_id);
        let mut next = self.clone();
        next.slots.retain(|id| *id != item_id);
        (next, vacated)
    }
}
