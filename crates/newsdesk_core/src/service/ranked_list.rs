//! Ranked list use-case service.
//!
//! # Responsibility
//! - Assign, auto-assign, remove and list members of one list kind.
//! - Keep the in-memory slot state and the store in lockstep.
//!
//! # Invariants
//! - Every mutation holds the list mutex from the first read of current
//!   members through the store commit.
//! - The in-memory slots are replaced only after the store committed, so a
//!   failed commit leaves both sides exactly as before the call.
//! - Caller errors (`InvalidRank`, `NotFound`) are raised before any write.

use crate::model::content::ItemId;
use crate::model::ranking::{ListKind, Rank, RankedEntry};
use crate::ranking::{plan_slot_writes, RankedSlots, SlotError, SlotOutcome};
use crate::repo::content_repo::ContentRepository;
use crate::repo::ranking_repo::RankingRepository;
use crate::repo::store::RepoError;
use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub type RankingResult<T> = Result<T, RankingError>;

/// Errors from ranked list operations.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Requested rank is outside `1..=capacity`.
    #[error("rank {rank} is outside 1..={capacity} for {kind}")]
    InvalidRank {
        kind: ListKind,
        rank: Rank,
        capacity: Rank,
    },
    /// Item id does not resolve in the content store.
    #[error("content item not found: {0}")]
    NotFound(ItemId),
    /// Persisted members of a list are not a contiguous ranking.
    #[error("ranking for {kind} is corrupt: {reason}")]
    CorruptRanking { kind: ListKind, reason: String },
    /// Store read or commit failed; nothing was applied.
    #[error("ranking store failure: {0}")]
    Store(#[source] RepoError),
}

impl From<RepoError> for RankingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(item_id) => Self::NotFound(item_id),
            other => Self::Store(other),
        }
    }
}

impl From<SlotError> for RankingError {
    fn from(value: SlotError) -> Self {
        match value {
            SlotError::InvalidRank {
                kind,
                rank,
                capacity,
            } => Self::InvalidRank {
                kind,
                rank,
                capacity,
            },
            SlotError::Corrupt { kind, reason } => Self::CorruptRanking { kind, reason },
        }
    }
}

/// Capacity-bounded, gap-free ranking for one list kind.
pub struct RankedListManager<S> {
    kind: ListKind,
    store: Arc<S>,
    slots: Mutex<RankedSlots>,
}

impl<S> RankedListManager<S>
where
    S: RankingRepository + ContentRepository,
{
    /// Loads the persisted members of `kind` and validates them.
    ///
    /// # Errors
    /// - `RankingError::CorruptRanking` when stored ranks are not `1..=k`.
    /// - `RankingError::Store` when the scan fails.
    pub fn open(kind: ListKind, store: Arc<S>) -> RankingResult<Self> {
        let members = store.list_members(kind)?;
        let slots = RankedSlots::from_members(kind, &members)?;
        info!(
            "event=ranking_open module=ranking status=ok kind={} members={}",
            kind,
            slots.len()
        );
        Ok(Self {
            kind,
            store,
            slots: Mutex::new(slots),
        })
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Places `item_id` at `rank`, shifting members at or below it.
    ///
    /// Returns the rank the item holds afterwards. A request past the end of
    /// the occupied run lands on the first free rank.
    ///
    /// # Errors
    /// - `InvalidRank` when `rank` is outside `1..=capacity`.
    /// - `NotFound` when the item does not exist.
    /// - `Store` when the commit fails; the list is unchanged.
    pub fn assign(&self, item_id: ItemId, rank: Rank) -> RankingResult<Rank> {
        let capacity = self.kind.capacity();
        if rank == 0 || rank > capacity {
            return Err(RankingError::InvalidRank {
                kind: self.kind,
                rank,
                capacity,
            });
        }

        let mut slots = self.lock_slots();
        self.ensure_item_exists(item_id)?;
        let (next, outcome) = slots.assign(item_id, rank)?;
        if outcome.changed {
            self.commit(&mut slots, next, item_id, "rank_assign")?;
            self.log_outcome("rank_assign", item_id, outcome);
        }
        Ok(outcome.rank)
    }

    /// Appends `item_id` at the lowest free rank, evicting the last member
    /// when the list is full. Existing members keep their rank.
    pub fn auto_assign(&self, item_id: ItemId) -> RankingResult<Rank> {
        let mut slots = self.lock_slots();
        self.ensure_item_exists(item_id)?;
        let (next, outcome) = slots.auto_assign(item_id);
        if outcome.changed {
            self.commit(&mut slots, next, item_id, "rank_auto_assign")?;
            self.log_outcome("rank_auto_assign", item_id, outcome);
        }
        Ok(outcome.rank)
    }

    /// Clears the membership of `item_id` and compacts the ranks after it.
    ///
    /// Removing a non-member succeeds without writes.
    pub fn remove(&self, item_id: ItemId) -> RankingResult<()> {
        let mut slots = self.lock_slots();
        self.ensure_item_exists(item_id)?;
        let (next, vacated) = slots.remove(item_id);
        if let Some(rank) = vacated {
            self.commit(&mut slots, next, item_id, "rank_remove")?;
            info!(
                "event=rank_remove module=ranking status=ok kind={} item_id={} vacated_rank={} members={}",
                self.kind,
                item_id,
                rank,
                slots.len()
            );
        }
        Ok(())
    }

    /// Current members ordered by ascending rank.
    pub fn list(&self) -> Vec<RankedEntry> {
        self.lock_slots().entries()
    }

    /// Current rank of one item, `None` for non-members.
    pub fn rank_of(&self, item_id: ItemId) -> Option<Rank> {
        self.lock_slots().rank_of(item_id)
    }

    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn lock_slots(&self) -> MutexGuard<'_, RankedSlots> {
        // Slots are only replaced after a successful commit, so the state
        // behind a poisoned lock is still the last committed one.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_item_exists(&self, item_id: ItemId) -> RankingResult<()> {
        if !self.store.item_exists(item_id)? {
            return Err(RankingError::NotFound(item_id));
        }
        Ok(())
    }

    fn commit(
        &self,
        slots: &mut MutexGuard<'_, RankedSlots>,
        next: RankedSlots,
        item_id: ItemId,
        event: &'static str,
    ) -> RankingResult<()> {
        let writes = plan_slot_writes(&**slots, &next);
        if let Err(err) = self.store.apply_slot_writes(self.kind, &writes) {
            error!(
                "event={} module=ranking status=error kind={} item_id={} writes={} error_code=slot_commit_failed error={}",
                event,
                self.kind,
                item_id,
                writes.len(),
                err
            );
            return Err(RankingError::Store(err));
        }
        **slots = next;
        Ok(())
    }

    fn log_outcome(&self, event: &'static str, item_id: ItemId, outcome: SlotOutcome) {
        info!(
            "event={} module=ranking status=ok kind={} item_id={} rank={}",
            event, self.kind, item_id, outcome.rank
        );
        if let Some(evicted) = outcome.evicted {
            info!(
                "event=rank_evict module=ranking status=ok kind={} item_id={} by={}",
                self.kind, evicted, item_id
            );
        }
    }
}
