//! Ranked slot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Scan the members of one list kind in rank order.
//! - Apply one planned slot transition atomically.
//!
//! # Invariants
//! - `ranked_slots` rows are never deleted; leaving a list clears
//!   `is_member` and `rank`.
//! - `(list_kind, rank)` is unique in storage, so writes are applied in the
//!   exact order given by the planner.

use crate::model::content::ItemId;
use crate::model::ranking::{ListKind, Rank, RankedEntry, RankedItem};
use crate::ranking::SlotWrite;
use crate::repo::store::{parse_flag, parse_uuid, RepoError, RepoResult, SqliteStore};
use log::debug;
use rusqlite::{params, TransactionBehavior};

/// Repository interface for ranked list membership.
pub trait RankingRepository {
    /// Returns current members of `kind` ordered by ascending rank.
    fn list_members(&self, kind: ListKind) -> RepoResult<Vec<RankedEntry>>;
    /// Returns the membership row of one item, if it was ever ranked.
    fn membership(&self, kind: ListKind, item_id: ItemId) -> RepoResult<Option<RankedItem>>;
    /// Applies all writes in order inside one transaction.
    fn apply_slot_writes(&self, kind: ListKind, writes: &[SlotWrite]) -> RepoResult<()>;
}

impl RankingRepository for SqliteStore {
    fn list_members(&self, kind: ListKind) -> RepoResult<Vec<RankedEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT item_id, rank
                 FROM ranked_slots
                 WHERE list_kind = ?1
                   AND is_member = 1
                 ORDER BY rank ASC;",
            )?;
            let mut rows = stmt.query([kind.as_str()])?;
            let mut members = Vec::new();
            while let Some(row) = rows.next()? {
                let item_id_text: String = row.get(0)?;
                members.push(RankedEntry {
                    item_id: parse_uuid(&item_id_text, "ranked_slots.item_id")?,
                    rank: row.get(1)?,
                });
            }
            Ok(members)
        })
    }

    fn membership(&self, kind: ListKind, item_id: ItemId) -> RepoResult<Option<RankedItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT is_member, rank
                 FROM ranked_slots
                 WHERE list_kind = ?1
                   AND item_id = ?2;",
            )?;
            let mut rows = stmt.query(params![kind.as_str(), item_id.to_string()])?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };

            let is_member = parse_flag(row.get(0)?, "ranked_slots.is_member")?;
            let rank: Option<Rank> = row.get(1)?;
            if is_member != rank.is_some() {
                return Err(RepoError::InvalidData(format!(
                    "membership of {item_id} in {kind} has is_member={is_member} rank={rank:?}"
                )));
            }

            Ok(Some(RankedItem {
                item_id,
                kind,
                is_member,
                rank,
            }))
        })
    }

    fn apply_slot_writes(&self, kind: ListKind, writes: &[SlotWrite]) -> RepoResult<()> {
        if writes.is_empty() {
            return Ok(());
        }

        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            for write in writes {
                match *write {
                    SlotWrite::Place { item_id, rank } => {
                        tx.execute(
                            "INSERT INTO ranked_slots (list_kind, item_id, is_member, rank)
                             VALUES (?1, ?2, 1, ?3)
                             ON CONFLICT (list_kind, item_id) DO UPDATE
                             SET is_member = 1,
                                 rank = excluded.rank,
                                 updated_at = (strftime('%s', 'now') * 1000);",
                            params![kind.as_str(), item_id.to_string(), rank],
                        )?;
                    }
                    SlotWrite::Clear { item_id } => {
                        let changed = tx.execute(
                            "UPDATE ranked_slots
                             SET is_member = 0,
                                 rank = NULL,
                                 updated_at = (strftime('%s', 'now') * 1000)
                             WHERE list_kind = ?1
                               AND item_id = ?2;",
                            params![kind.as_str(), item_id.to_string()],
                        )?;
                        if changed == 0 {
                            return Err(RepoError::InvalidData(format!(
                                "no slot row for {item_id} in {kind}"
                            )));
                        }
                    }
                }
            }
            tx.commit()?;

            debug!(
                "event=slot_commit module=repo status=ok kind={} writes={}",
                kind,
                writes.len()
            );
            Ok(())
        })
    }
}
