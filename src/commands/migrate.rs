//! Migrate command - turn timestamp bookmarks into chapter bookmarks
//!
//! Bookmarks are processed one at a time with a pause before each provider
//! request. Each resolved bookmark is written as soon as it is known, so an
//! interrupted run keeps its progress and a re-run skips what is done.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::{find_collection, open_store, runtime};
use crate::config::Config;
use crate::database::CollectionStore;
use crate::error::ProviderError;
use crate::models::{Bookmark, Collection, ReadState, Series};
use crate::providers::ProviderRegistry;
use crate::reading::{resolve_bookmark, Resolution};

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Pause before every provider request after the first
    pub delay: Duration,
    /// Extra attempts for transient fetch failures
    pub max_retries: u32,
    /// Write results to the store; otherwise only report them
    pub apply: bool,
}

/// What happened to one bookmark
#[derive(Debug)]
pub enum Outcome {
    /// Resolved to a chapter, or `None` when nothing had been read
    Migrated(Option<String>),
    AlreadyMigrated,
    Unread,
    Unsupported,
    /// The provider listed no chapters; the timestamp is kept
    NoChapters,
    FetchFailed(ProviderError),
    WriteFailed(anyhow::Error),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::FetchFailed(_) | Outcome::WriteFailed(_))
    }
}

/// Per-bookmark outcomes, in collection order
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub outcomes: Vec<(String, Outcome)>,
}

impl MigrationReport {
    pub fn migrated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Migrated(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    Outcome::AlreadyMigrated
                        | Outcome::Unread
                        | Outcome::Unsupported
                        | Outcome::NoChapters
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Run the migration for a stored collection
pub fn run(
    config: &Config,
    store: Option<&PathBuf>,
    slug: &str,
    no_dry_run: bool,
    delay_ms: Option<u64>,
) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;
    let registry = ProviderRegistry::from_config(config)?;

    let options = MigrateOptions {
        delay: Duration::from_millis(config.migrate_delay_ms(delay_ms)),
        max_retries: config.migrate.max_retries,
        apply: no_dry_run,
    };

    println!(
        "Migrating {} bookmarks in '{}'...",
        collection.bookmarks.len(),
        collection.name
    );
    println!();

    let report = runtime()?.block_on(migrate_collection(&registry, &db, &collection, &options));

    println!();
    println!(
        "{} migrated, {} skipped, {} failed",
        report.migrated().to_string().green(),
        report.skipped(),
        if report.failed() > 0 {
            report.failed().to_string().red()
        } else {
            report.failed().to_string().normal()
        }
    );
    if !no_dry_run && report.migrated() > 0 {
        println!("{}", "(dry-run, use --no-dry-run to apply)".yellow());
    }
    Ok(())
}

/// Migrate every timestamp bookmark in `collection`, one at a time.
///
/// A failed fetch or write is recorded and the batch moves on.
pub async fn migrate_collection<S: CollectionStore>(
    registry: &ProviderRegistry,
    store: &S,
    collection: &Collection,
    options: &MigrateOptions,
) -> MigrationReport {
    let total = collection.bookmarks.len();
    let mut report = MigrationReport::default();
    let mut requested = false;

    for (i, bookmark) in collection.bookmarks.iter().enumerate() {
        print!("[{}/{}] {}... ", i + 1, total, bookmark.series_id);
        io::stdout().flush().ok();

        let outcome = match bookmark.state {
            ReadState::Unread => Outcome::Unread,
            ReadState::ReadThrough { .. } => Outcome::AlreadyMigrated,
            ReadState::ReadAt { .. } => {
                if requested {
                    tokio::time::sleep(options.delay).await;
                }
                requested = true;

                match fetch_with_retry(registry, bookmark, options).await {
                    Ok(series) => {
                        migrate_bookmark(store, &collection.slug, &series, bookmark, options)
                    }
                    Err(e) => {
                        warn!("Fetching {} failed: {}", bookmark.series_id, e);
                        Outcome::FetchFailed(e)
                    }
                }
            }
        };

        println!("{}", describe(&outcome, options.apply));
        report.outcomes.push((bookmark.series_id.clone(), outcome));
    }

    info!(
        "Migration of {} finished: {} migrated, {} failed",
        collection.slug,
        report.migrated(),
        report.failed()
    );
    report
}

fn migrate_bookmark<S: CollectionStore>(
    store: &S,
    slug: &str,
    series: &Series,
    bookmark: &Bookmark,
    options: &MigrateOptions,
) -> Outcome {
    let chapter_id = match resolve_bookmark(series, bookmark) {
        Resolution::Unsupported => return Outcome::Unsupported,
        Resolution::NotTimestamped => return Outcome::AlreadyMigrated,
        Resolution::Resolved(_) if series.chapters.is_empty() => return Outcome::NoChapters,
        Resolution::Resolved(chapter_id) => chapter_id,
    };

    if options.apply {
        let state = match &chapter_id {
            Some(id) => ReadState::ReadThrough {
                last_read_chapter_id: id.clone(),
            },
            None => ReadState::Unread,
        };
        let updated = Bookmark {
            state,
            ..bookmark.clone()
        };
        if let Err(e) = store.update_bookmark(slug, &updated) {
            warn!("Writing {} failed: {:#}", bookmark.series_id, e);
            return Outcome::WriteFailed(e);
        }
    }

    Outcome::Migrated(chapter_id)
}

async fn fetch_with_retry(
    registry: &ProviderRegistry,
    bookmark: &Bookmark,
    options: &MigrateOptions,
) -> Result<Series, ProviderError> {
    let mut attempt = 0;
    loop {
        match registry
            .fetch_series(&bookmark.url, &bookmark.series_id)
            .await
        {
            Err(e) if e.is_retryable() && attempt < options.max_retries => {
                attempt += 1;
                warn!(
                    "Retrying {} ({}/{}): {}",
                    bookmark.series_id, attempt, options.max_retries, e
                );
                tokio::time::sleep(options.delay * attempt).await;
            }
            result => return result,
        }
    }
}

fn describe(outcome: &Outcome, apply: bool) -> String {
    let verb = if apply { "migrated" } else { "would migrate" };
    match outcome {
        Outcome::Migrated(Some(id)) => format!("{} to chapter {}", verb, id).green().to_string(),
        Outcome::Migrated(None) => format!("{} to unread", verb).green().to_string(),
        Outcome::AlreadyMigrated => "already migrated".dimmed().to_string(),
        Outcome::Unread => "unread, skipping".dimmed().to_string(),
        Outcome::Unsupported => "provider has no chapters, skipping".dimmed().to_string(),
        Outcome::NoChapters => "no chapters listed, skipping".dimmed().to_string(),
        Outcome::FetchFailed(e) => format!("error: {}", e).red().to_string(),
        Outcome::WriteFailed(e) => format!("write failed: {:#}", e).red().to_string(),
    }
}
