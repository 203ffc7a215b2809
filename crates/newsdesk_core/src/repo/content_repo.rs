//! Content item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the read-by-id, write and scan operations the ranking core
//!   consumes from the content store.
//!
//! # Invariants
//! - Write paths call `ContentItem::validate()` before SQL mutations.
//! - Listing is deterministic: `published_on DESC, item_id ASC`.

use crate::model::content::{ContentItem, ItemId};
use crate::repo::store::{
    format_date, item_exists, parse_date, parse_uuid, RepoError, RepoResult, SqliteStore,
};
use rusqlite::{params, Row};

const CONTENT_SELECT_SQL: &str = "SELECT
    item_id,
    headline,
    source,
    category,
    published_on
FROM content_items";

const LIST_DEFAULT_LIMIT: u32 = 20;
const LIST_LIMIT_MAX: u32 = 100;

/// Pagination options for content listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentListQuery {
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for content items.
pub trait ContentRepository {
    fn create_item(&self, item: &ContentItem) -> RepoResult<ItemId>;
    fn update_item(&self, item: &ContentItem) -> RepoResult<()>;
    fn get_item(&self, item_id: ItemId) -> RepoResult<Option<ContentItem>>;
    fn item_exists(&self, item_id: ItemId) -> RepoResult<bool>;
    fn list_items(&self, query: &ContentListQuery) -> RepoResult<Vec<ContentItem>>;
    fn count_items(&self) -> RepoResult<u64>;
}

impl ContentRepository for SqliteStore {
    fn create_item(&self, item: &ContentItem) -> RepoResult<ItemId> {
        item.validate()?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO content_items (
                    item_id,
                    headline,
                    source,
                    category,
                    published_on
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    item.item_id.to_string(),
                    item.headline.as_str(),
                    item.source.as_str(),
                    item.category.as_str(),
                    format_date(item.published_on),
                ],
            )?;
            Ok(item.item_id)
        })
    }

    fn update_item(&self, item: &ContentItem) -> RepoResult<()> {
        item.validate()?;

        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE content_items
                 SET
                    headline = ?1,
                    source = ?2,
                    category = ?3,
                    published_on = ?4,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE item_id = ?5;",
                params![
                    item.headline.as_str(),
                    item.source.as_str(),
                    item.category.as_str(),
                    format_date(item.published_on),
                    item.item_id.to_string(),
                ],
            )?)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.item_id));
        }
        Ok(())
    }

    fn get_item(&self, item_id: ItemId) -> RepoResult<Option<ContentItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{CONTENT_SELECT_SQL} WHERE item_id = ?1;"))?;
            let mut rows = stmt.query([item_id.to_string()])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(parse_content_row(row)?));
            }
            Ok(None)
        })
    }

    fn item_exists(&self, item_id: ItemId) -> RepoResult<bool> {
        self.with_conn(|conn| item_exists(conn, item_id))
    }

    fn list_items(&self, query: &ContentListQuery) -> RepoResult<Vec<ContentItem>> {
        let limit = query
            .limit
            .unwrap_or(LIST_DEFAULT_LIMIT)
            .clamp(1, LIST_LIMIT_MAX);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{CONTENT_SELECT_SQL}
                 ORDER BY published_on DESC, item_id ASC
                 LIMIT ?1 OFFSET ?2;"
            ))?;
            let mut rows = stmt.query(params![i64::from(limit), i64::from(query.offset)])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_content_row(row)?);
            }
            Ok(items)
        })
    }

    fn count_items(&self) -> RepoResult<u64> {
        let count: i64 = self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM content_items;", [], |row| {
                row.get(0)
            })?)
        })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative content count `{count}`")))
    }
}

fn parse_content_row(row: &Row<'_>) -> RepoResult<ContentItem> {
    let item_id_text: String = row.get("item_id")?;
    let published_text: String = row.get("published_on")?;

    let item = ContentItem {
        item_id: parse_uuid(&item_id_text, "content_items.item_id")?,
        headline: row.get("headline")?,
        source: row.get("source")?,
        category: row.get("category")?,
        published_on: parse_date(&published_text, "content_items.published_on")?,
    };
    item.validate()?;
    Ok(item)
}
