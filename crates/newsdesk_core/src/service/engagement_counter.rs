//! Engagement counter use-case service.
//!
//! # Responsibility
//! - Record visits and expose per-item and aggregate visitor counts.
//!
//! # Invariants
//! - Counter resets are computed lazily from the visit date; no scheduler.
//! - A visit is one read-modify-write transaction in the store, so visits
//!   to the same item are serialized and never partially applied.

use crate::model::content::ItemId;
use crate::model::engagement::{EngagementSummary, VisitCounts};
use crate::repo::content_repo::ContentRepository;
use crate::repo::engagement_repo::EngagementRepository;
use crate::repo::store::RepoError;
use chrono::NaiveDate;
use log::{debug, error};
use std::sync::Arc;
use thiserror::Error;

/// Errors from engagement operations.
#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("content item not found: {0}")]
    NotFound(ItemId),
    #[error("engagement store failure: {0}")]
    Store(#[source] RepoError),
}

impl From<RepoError> for EngagementError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(item_id) => Self::NotFound(item_id),
            other => Self::Store(other),
        }
    }
}

/// Per-item daily/monthly visit counter.
pub struct EngagementCounter<S> {
    store: Arc<S>,
}

impl<S> EngagementCounter<S>
where
    S: EngagementRepository + ContentRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records one visit to `item_id` on `today`.
    ///
    /// Returns the counters after the visit.
    pub fn record_visit(
        &self,
        item_id: ItemId,
        today: NaiveDate,
    ) -> Result<VisitCounts, EngagementError> {
        match self
            .store
            .update_engagement(item_id, |record| record.record_visit(today))
        {
            Ok(counts) => {
                debug!(
                    "event=visit_record module=engagement status=ok item_id={} daily={} monthly={}",
                    item_id, counts.daily_visitors, counts.monthly_visitors
                );
                Ok(counts)
            }
            Err(RepoError::NotFound(item_id)) => Err(EngagementError::NotFound(item_id)),
            Err(err) => {
                error!(
                    "event=visit_record module=engagement status=error item_id={} error_code=visit_commit_failed error={}",
                    item_id, err
                );
                Err(EngagementError::Store(err))
            }
        }
    }

    /// Returns stored counters without recording a visit.
    ///
    /// Items that were never visited report zero for both counters.
    pub fn visit_stats(&self, item_id: ItemId) -> Result<VisitCounts, EngagementError> {
        if !self.store.item_exists(item_id)? {
            return Err(EngagementError::NotFound(item_id));
        }
        Ok(self
            .store
            .get_engagement(item_id)?
            .map(|record| record.counts())
            .unwrap_or_default())
    }

    /// Dashboard aggregate as of `today`.
    pub fn summary(&self, today: NaiveDate) -> Result<EngagementSummary, EngagementError> {
        let totals = self.store.engagement_totals(today)?;
        Ok(EngagementSummary {
            total_items: self.store.count_items()?,
            daily_visitors: totals.daily_visitors,
            monthly_visitors: totals.monthly_visitors,
        })
    }
}
