//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into ranking and engagement use-cases.
//! - Keep API layers decoupled from storage details.

pub mod engagement_counter;
pub mod featured;
pub mod ranked_list;
