//! Ranked list kinds and membership records.
//!
//! # Responsibility
//! - Name the closed set of ranked lists and their fixed capacities.
//! - Define the per-item membership record shared by engine and store.
//!
//! # Invariants
//! - `rank` is `Some` iff `is_member` is true, and lies in `[1, capacity]`.
//! - The two list kinds never share state.

use crate::model::content::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One-based position inside a ranked list. Lower is more prominent.
pub type Rank = u32;

/// Number of slots in the Top News list.
pub const TOP_NEWS_CAPACITY: Rank = 20;
/// Number of slots in the Trending News list.
pub const TRENDING_CAPACITY: Rank = 30;

/// The independent ranked lists maintained by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    TopNews,
    Trending,
}

impl ListKind {
    /// Every list kind, in a stable order.
    pub const ALL: [ListKind; 2] = [ListKind::TopNews, ListKind::Trending];

    /// Fixed slot count for this list.
    pub fn capacity(self) -> Rank {
        match self {
            Self::TopNews => TOP_NEWS_CAPACITY,
            Self::Trending => TRENDING_CAPACITY,
        }
    }

    /// Stable storage/log name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopNews => "top_news",
            Self::Trending => "trending",
        }
    }

    /// Parses a stable storage name back into a list kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top_news" => Some(Self::TopNews),
            "trending" => Some(Self::Trending),
            _ => None,
        }
    }
}

impl Display for ListKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership state of one item in one list kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub item_id: ItemId,
    pub kind: ListKind,
    pub is_member: bool,
    pub rank: Option<Rank>,
}

/// One occupied slot as returned by ordered list scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub item_id: ItemId,
    pub rank: Rank,
}
