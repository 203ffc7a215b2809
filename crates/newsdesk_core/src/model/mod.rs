//! Domain model for content items and their satellite ranking/engagement records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep ranking and engagement state keyed by `ItemId`, never by copy.
//!
//! # Invariants
//! - Every content item is identified by a stable `ItemId`.
//! - Ranking membership is cleared, never physically deleted.

pub mod content;
pub mod engagement;
pub mod ranking;
