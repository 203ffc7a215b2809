//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for content items,
//!   ranked slots and engagement counters.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Multi-row mutations run inside one `IMMEDIATE` transaction and either
//!   commit completely or leave storage untouched.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod content_repo;
pub mod engagement_repo;
pub mod ranking_repo;
pub mod store;
