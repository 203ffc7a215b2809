//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `newsdesk_core` linkage.
//! - Exercise both rankings and the engagement counter against an in-memory
//!   store and print the resulting state.
//! - Route the engine's log events to a rolling file under the log dir.

use chrono::{Local, NaiveDate};
use newsdesk_core::{
    default_log_level, init_logging, ContentItem, ContentRepository, FeaturedContent, ListKind,
    SqliteStore,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_DIR_ENV: &str = "NEWSDESK_LOG_DIR";

const SEED_HEADLINES: [&str; 4] = [
    "Council approves transit budget",
    "Storm warning issued for the coast",
    "Local team wins regional final",
    "New library branch opens downtown",
];

fn main() {
    println!("newsdesk_core ping={}", newsdesk_core::ping());
    println!("newsdesk_core version={}", newsdesk_core::core_version());

    if let Err(err) = run(&log_dir()) {
        eprintln!("newsdesk smoke failed: {err}");
        std::process::exit(1);
    }
}

/// `$NEWSDESK_LOG_DIR` when set, otherwise `<tmp>/newsdesk-logs`.
fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("newsdesk-logs"))
}

fn run(log_dir: &Path) -> Result<(), Box<dyn Error>> {
    init_logging(default_log_level().as_str(), &log_dir.to_string_lossy())?;
    println!("newsdesk logs={}", log_dir.display());

    let today = Local::now().date_naive();
    let store = Arc::new(SqliteStore::open_in_memory()?);

    let mut ids = Vec::with_capacity(SEED_HEADLINES.len());
    for headline in SEED_HEADLINES {
        let item = ContentItem::new(headline, "wire", "local", today);
        ids.push(store.create_item(&item)?);
    }

    let featured = FeaturedContent::open(Arc::clone(&store))?;
    for id in &ids {
        featured.auto_assign(ListKind::Trending, *id)?;
    }
    featured.assign(ListKind::TopNews, ids[2], 1)?;
    featured.assign(ListKind::TopNews, ids[0], 1)?;
    featured.remove(ListKind::Trending, ids[1])?;

    for id in ids.iter().take(2) {
        featured.record_visit(*id, today)?;
    }
    featured.record_visit(ids[0], today)?;

    for kind in ListKind::ALL {
        println!("{kind}:");
        for entry in featured.list(kind) {
            let headline = store
                .get_item(entry.item_id)?
                .map(|item| item.headline)
                .unwrap_or_default();
            println!("  {:>2}. {}", entry.rank, headline);
        }
    }

    print_summary(&featured, today)
}

fn print_summary(
    featured: &FeaturedContent<SqliteStore>,
    today: NaiveDate,
) -> Result<(), Box<dyn Error>> {
    let summary = featured.engagement_summary(today)?;
    println!(
        "engagement total_items={} daily_visitors={} monthly_visitors={}",
        summary.total_items, summary.daily_visitors, summary.monthly_visitors
    );
    Ok(())
}
