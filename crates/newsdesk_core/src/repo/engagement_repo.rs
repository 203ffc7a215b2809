//! Engagement counter repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and persist per-item visit counters.
//! - Run read-modify-write counter updates as one transaction.
//! - Aggregate counters for dashboard summaries.
//!
//! # Invariants
//! - Counter rows only exist for existing content items.
//! - An update either persists the mutated record or nothing.

use crate::model::content::ItemId;
use crate::model::engagement::EngagementRecord;
use crate::repo::store::{
    format_date, item_exists, parse_date, RepoError, RepoResult, SqliteStore,
};
use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Length of the trailing window used for monthly dashboard totals.
pub const MONTHLY_WINDOW_DAYS: u64 = 30;

/// Summed visitor counters across all items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementTotals {
    pub daily_visitors: u64,
    pub monthly_visitors: u64,
}

/// Repository interface for engagement counters.
pub trait EngagementRepository {
    /// Returns the stored record, or `None` for a never-visited item.
    fn get_engagement(&self, item_id: ItemId) -> RepoResult<Option<EngagementRecord>>;

    /// Loads the record (creating a fresh one when absent), applies `update`
    /// and writes it back, all inside one transaction.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `item_id` has no content item.
    fn update_engagement<T, F>(&self, item_id: ItemId, update: F) -> RepoResult<T>
    where
        F: FnOnce(&mut EngagementRecord) -> T;

    /// Sums daily counters last visited on `today` and monthly counters last
    /// visited within the trailing window ending on `today`.
    fn engagement_totals(&self, today: NaiveDate) -> RepoResult<EngagementTotals>;
}

impl EngagementRepository for SqliteStore {
    fn get_engagement(&self, item_id: ItemId) -> RepoResult<Option<EngagementRecord>> {
        self.with_conn(|conn| load_record(conn, item_id))
    }

    fn update_engagement<T, F>(&self, item_id: ItemId, update: F) -> RepoResult<T>
    where
        F: FnOnce(&mut EngagementRecord) -> T,
    {
        self.with_conn(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if !item_exists(&tx, item_id)? {
                return Err(RepoError::NotFound(item_id));
            }

            let mut record =
                load_record(&tx, item_id)?.unwrap_or_else(|| EngagementRecord::new(item_id));
            let output = update(&mut record);

            tx.execute(
                "INSERT INTO engagement (
                    item_id,
                    daily_visitors,
                    monthly_visitors,
                    last_visited_on
                ) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (item_id) DO UPDATE
                SET daily_visitors = excluded.daily_visitors,
                    monthly_visitors = excluded.monthly_visitors,
                    last_visited_on = excluded.last_visited_on,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    item_id.to_string(),
                    record.daily_visitors,
                    record.monthly_visitors,
                    record.last_visited_on.map(format_date),
                ],
            )?;
            tx.commit()?;
            Ok(output)
        })
    }

    fn engagement_totals(&self, today: NaiveDate) -> RepoResult<EngagementTotals> {
        let window_start = today
            .checked_sub_days(Days::new(MONTHLY_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);

        let (daily, monthly): (i64, i64) = self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN last_visited_on = ?1 THEN daily_visitors END), 0),
                    COALESCE(SUM(CASE WHEN last_visited_on >= ?2 THEN monthly_visitors END), 0)
                 FROM engagement;",
                params![format_date(today), format_date(window_start)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?)
        })?;

        Ok(EngagementTotals {
            daily_visitors: non_negative(daily, "daily_visitors")?,
            monthly_visitors: non_negative(monthly, "monthly_visitors")?,
        })
    }
}

fn load_record(conn: &Connection, item_id: ItemId) -> RepoResult<Option<EngagementRecord>> {
    let row: Option<(u32, u32, Option<String>)> = conn
        .query_row(
            "SELECT daily_visitors, monthly_visitors, last_visited_on
             FROM engagement
             WHERE item_id = ?1;",
            [item_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((daily_visitors, monthly_visitors, last_visited_text)) = row else {
        return Ok(None);
    };
    let last_visited_on = last_visited_text
        .map(|value| parse_date(&value, "engagement.last_visited_on"))
        .transpose()?;

    Ok(Some(EngagementRecord {
        item_id,
        daily_visitors,
        monthly_visitors,
        last_visited_on,
    }))
}

fn non_negative(value: i64, column: &'static str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative total `{value}` for {column}")))
}
