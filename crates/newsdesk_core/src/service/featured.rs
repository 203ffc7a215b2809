//! Featured content facade.
//!
//! # Responsibility
//! - Expose ranking and engagement operations keyed by `ListKind`.
//! - Own one independently locked manager per list kind.
//!
//! # Invariants
//! - Operations on different list kinds never wait on each other's lock.

use crate::model::content::ItemId;
use crate::model::engagement::{EngagementSummary, VisitCounts};
use crate::model::ranking::{ListKind, Rank, RankedEntry};
use crate::repo::content_repo::ContentRepository;
use crate::repo::engagement_repo::EngagementRepository;
use crate::repo::ranking_repo::RankingRepository;
use crate::service::engagement_counter::{EngagementCounter, EngagementError};
use crate::service::ranked_list::{RankedListManager, RankingResult};
use chrono::NaiveDate;
use std::sync::Arc;

/// Entry point used by the API layer.
pub struct FeaturedContent<S> {
    top_news: RankedListManager<S>,
    trending: RankedListManager<S>,
    engagement: EngagementCounter<S>,
}

impl<S> FeaturedContent<S>
where
    S: RankingRepository + EngagementRepository + ContentRepository,
{
    /// Loads both rankings from `store`.
    pub fn open(store: Arc<S>) -> RankingResult<Self> {
        Ok(Self {
            top_news: RankedListManager::open(ListKind::TopNews, Arc::clone(&store))?,
            trending: RankedListManager::open(ListKind::Trending, Arc::clone(&store))?,
            engagement: EngagementCounter::new(store),
        })
    }

    pub fn list_manager(&self, kind: ListKind) -> &RankedListManager<S> {
        match kind {
            ListKind::TopNews => &self.top_news,
            ListKind::Trending => &self.trending,
        }
    }

    pub fn engagement(&self) -> &EngagementCounter<S> {
        &self.engagement
    }

    pub fn assign(&self, kind: ListKind, item_id: ItemId, rank: Rank) -> RankingResult<Rank> {
        self.list_manager(kind).assign(item_id, rank)
    }

    pub fn auto_assign(&self, kind: ListKind, item_id: ItemId) -> RankingResult<Rank> {
        self.list_manager(kind).auto_assign(item_id)
    }

    pub fn remove(&self, kind: ListKind, item_id: ItemId) -> RankingResult<()> {
        self.list_manager(kind).remove(item_id)
    }

    pub fn list(&self, kind: ListKind) -> Vec<RankedEntry> {
        self.list_manager(kind).list()
    }

    pub fn record_visit(
        &self,
        item_id: ItemId,
        today: NaiveDate,
    ) -> Result<VisitCounts, EngagementError> {
        self.engagement.record_visit(item_id, today)
    }

    pub fn visit_stats(&self, item_id: ItemId) -> Result<VisitCounts, EngagementError> {
        self.engagement.visit_stats(item_id)
    }

    pub fn engagement_summary(
        &self,
        today: NaiveDate,
    ) -> Result<EngagementSummary, EngagementError> {
        self.engagement.summary(today)
    }
}
