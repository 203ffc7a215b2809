//! Content item model.
//!
//! # Responsibility
//! - Define the canonical record owned by the content store.
//! - Validate the minimum shape required before persistence.
//!
//! # Invariants
//! - `item_id` is stable and never reused for another item.
//! - `headline` is never blank.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier for one content item.
///
/// Ranking and engagement records hold this id as their only reference to
/// the item.
pub type ItemId = Uuid;

/// Validation errors raised before a content item is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentValidationError {
    #[error("headline must not be blank")]
    BlankHeadline,
    #[error("source must not be blank")]
    BlankSource,
}

/// Canonical content record as seen by the ranking core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub item_id: ItemId,
    pub headline: String,
    /// Publisher or feed name the item was ingested from.
    pub source: String,
    /// Free-form editorial category (`politics`, `sports`, ...).
    pub category: String,
    pub published_on: NaiveDate,
}

impl ContentItem {
    /// Creates a content item with a generated stable ID.
    pub fn new(
        headline: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        published_on: NaiveDate,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), headline, source, category, published_on)
    }

    /// Creates a content item with a caller-provided stable ID.
    ///
    /// Used by ingestion paths where identity already exists upstream.
    pub fn with_id(
        item_id: ItemId,
        headline: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        published_on: NaiveDate,
    ) -> Self {
        Self {
            item_id,
            headline: headline.into(),
            source: source.into(),
            category: category.into(),
            published_on,
        }
    }

    /// Checks the fields the store refuses to persist.
    pub fn validate(&self) -> Result<(), ContentValidationError> {
        if self.headline.trim().is_empty() {
            return Err(ContentValidationError::BlankHeadline);
        }
        if self.source.trim().is_empty() {
            return Err(ContentValidationError::BlankSource);
        }
        Ok(())
    }
}
