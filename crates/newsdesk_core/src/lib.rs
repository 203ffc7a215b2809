//! Core domain logic for the newsdesk featured-content engine.
//! Owns the Top News and Trending rankings plus per-item engagement counters.

pub mod db;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::content::{ContentItem, ContentValidationError, ItemId};
pub use model::engagement::{EngagementRecord, EngagementSummary, VisitCounts};
pub use model::ranking::{
    ListKind, Rank, RankedEntry, RankedItem, TOP_NEWS_CAPACITY, TRENDING_CAPACITY,
};
pub use ranking::{plan_slot_writes, RankedSlots, SlotWrite};
pub use repo::content_repo::{ContentListQuery, ContentRepository};
pub use repo::engagement_repo::{EngagementRepository, EngagementTotals};
pub use repo::ranking_repo::RankingRepository;
pub use repo::store::{RepoError, RepoResult, SqliteStore};
pub use service::engagement_counter::{EngagementCounter, EngagementError};
pub use service::featured::FeaturedContent;
pub use service::ranked_list::{RankedListManager, RankingError, RankingResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
