//! Ordered row writes for a slot transition.
//!
//! Stores keep a unique `(list_kind, rank)` constraint that is checked
//! after every statement, so the writes of one transition must be ordered
//! such that no two rows ever hold the same rank, even momentarily:
//!
//! 1. Members leaving the list are cleared first.
//! 2. A move is emitted as soon as its target rank is free. For an
//!    insertion this yields the highest-first shift; for a removal the
//!    lowest-first compaction.
//! 3. When every pending move waits on another (a member jumping over the
//!    ones it displaces), the longest jump is parked (cleared) and placed
//!    again once its target frees up.
//! 4. New members are placed once their target rank is free.

use crate::model::content::ItemId;
use crate::model::ranking::Rank;
use crate::ranking::slots::RankedSlots;
use std::collections::HashMap;

/// One row mutation inside a slot commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
    /// Mark the item as a member holding `rank`.
    Place { item_id: ItemId, rank: Rank },
    /// Mark the item as a non-member with no rank.
    Clear { item_id: ItemId },
}

#[derive(Debug, Clone, Copy)]
struct PendingMove {
    item_id: ItemId,
    from: Option<Rank>,
    to: Rank,
}

impl PendingMove {
    fn distance(&self) -> Rank {
        self.from.map_or(0, |from| from.abs_diff(self.to))
    }
}

/// Computes the writes that turn `current` into `next`.
///
/// Returns an empty plan when both states are equal.
pub fn plan_slot_writes(current: &RankedSlots, next: &RankedSlots) -> Vec<SlotWrite> {
    let current_ranks: HashMap<ItemId, Rank> = current
        .entries()
        .into_iter()
        .map(|entry| (entry.item_id, entry.rank))
        .collect();
    let next_ranks: HashMap<ItemId, Rank> = next
        .entries()
        .into_iter()
        .map(|entry| (entry.item_id, entry.rank))
        .collect();

    let mut writes = Vec::new();
    let mut occupied: HashMap<Rank, ItemId> = HashMap::new();

    for entry in current.entries() {
        if next_ranks.contains_key(&entry.item_id) {
            occupied.insert(entry.rank, entry.item_id);
        } else {
            writes.push(SlotWrite::Clear {
                item_id: entry.item_id,
            });
        }
    }

    let mut pending: Vec<PendingMove> = next
        .entries()
        .into_iter()
        .filter_map(|entry| {
            let from = current_ranks.get(&entry.item_id).copied();
            if from == Some(entry.rank) {
                return None;
            }
            Some(PendingMove {
                item_id: entry.item_id,
                from,
                to: entry.rank,
            })
        })
        .collect();

    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|candidate| !occupied.contains_key(&candidate.to));

        match ready {
            Some(index) => {
                let step = pending.remove(index);
                if let Some(from) = step.from {
                    occupied.remove(&from);
                }
                occupied.insert(step.to, step.item_id);
                writes.push(SlotWrite::Place {
                    item_id: step.item_id,
                    rank: step.to,
                });
            }
            None => {
                // A free target always exists once every mover is parked.
                let Some(parked) = pending
                    .iter_mut()
                    .filter(|candidate| candidate.from.is_some())
                    .max_by_key(|candidate| candidate.distance())
                else {
                    break;
                };
                if let Some(from) = parked.from.take() {
                    occupied.remove(&from);
                }
                writes.push(SlotWrite::Clear {
                    item_id: parked.item_id,
                });
            }
        }
    }

    writes
}
