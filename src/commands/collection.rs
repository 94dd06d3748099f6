//! Collection commands - create, view and edit bookmark collections

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::{find_collection, format_date, open_store, runtime};
use crate::aggregate::{aggregate, CollectionEntry};
use crate::collection::{
    add_bookmark, generate_slug, mark_read, remove_bookmark, set_read_state, CollectionError,
};
use crate::config::Config;
use crate::database::CollectionStore;
use crate::models::{Bookmark, Collection, ReadState};
use crate::providers::ProviderRegistry;
use crate::reading::progress;

/// Create a collection from one or more series URLs
pub fn new(config: &Config, store: Option<&PathBuf>, name: &str, urls: &[String]) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Collection name must not be empty");
    }
    if urls.is_empty() {
        bail!("A collection needs at least one series");
    }

    let registry = ProviderRegistry::from_config(config)?;
    let mut bookmarks = Vec::new();
    for url in urls {
        let series_id = registry.series_id(url)?;
        bookmarks = add_bookmark(&bookmarks, Bookmark::new(series_id, url.as_str()))?;
    }

    let collection = Collection {
        slug: generate_slug(name),
        name: name.trim().to_string(),
        bookmarks,
    };

    let db = open_store(config, store)?;
    db.create(&collection)?;
    info!(
        "Created collection {} with {} series",
        collection.slug,
        collection.bookmarks.len()
    );

    println!(
        "{} Created '{}' with {} series",
        "✓".green(),
        collection.name,
        collection.bookmarks.len()
    );
    println!("Slug: {}", collection.slug.cyan());
    Ok(())
}

/// One row of `collection show --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryView<'a> {
    #[serde(flatten)]
    bookmark: &'a Bookmark,
    title: Option<&'a str>,
    updated_at: Option<i64>,
    supports_reading: Option<bool>,
    chapter_count: Option<usize>,
    unread_count: Option<usize>,
    next_unread_chapter_id: Option<String>,
    error: Option<String>,
}

/// Show every series in a collection, most recently updated first
pub fn show(
    config: &Config,
    store: Option<&PathBuf>,
    slug: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;
    let registry = ProviderRegistry::from_config(config)?;

    let entries = runtime()?.block_on(aggregate(&registry, &collection.bookmarks));

    if json {
        print_json(&entries)
    } else {
        print_pretty(&collection, &entries, quiet);
        Ok(())
    }
}

fn entry_view(entry: &CollectionEntry) -> EntryView<'_> {
    match &entry.series {
        Ok(series) => {
            let p = progress(series, &entry.bookmark.state);
            EntryView {
                bookmark: &entry.bookmark,
                title: Some(series.title.as_str()),
                updated_at: Some(series.updated_at),
                supports_reading: Some(series.supports_reading),
                chapter_count: Some(series.chapters.len()),
                unread_count: p.as_ref().map(|p| p.unread_count),
                next_unread_chapter_id: p
                    .and_then(|p| p.next_unread)
                    .map(|chapter| chapter.id),
                error: None,
            }
        }
        Err(e) => EntryView {
            bookmark: &entry.bookmark,
            title: None,
            updated_at: None,
            supports_reading: None,
            chapter_count: None,
            unread_count: None,
            next_unread_chapter_id: None,
            error: Some(e.to_string()),
        },
    }
}

fn print_json(entries: &[CollectionEntry]) -> Result<()> {
    let views: Vec<EntryView> = entries.iter().map(entry_view).collect();
    let json = serde_json::to_string_pretty(&views)?;
    println!("{}", json);
    Ok(())
}

fn print_pretty(collection: &Collection, entries: &[CollectionEntry], quiet: bool) {
    if !quiet {
        println!(
            "{} ({})",
            collection.name.bold(),
            collection.slug.dimmed()
        );
        println!("{}", "─".repeat(40));
    }

    if entries.is_empty() {
        println!("No series in this collection.");
        return;
    }

    for entry in entries {
        match &entry.series {
            Ok(series) => match progress(series, &entry.bookmark.state) {
                Some(p) => {
                    let unread = match p.unread_count {
                        0 => "caught up".green().to_string(),
                        n => format!("{} unread", n).yellow().to_string(),
                    };
                    println!(
                        "{}  {}  [{}]",
                        series.title.bold(),
                        format_date(series.updated_at).dimmed(),
                        unread
                    );

                    if let Some(next) = &p.next_unread {
                        println!("{:>12}: {}", "Next".cyan(), next.label());
                    }
                    if let Some(last) = &p.last_read {
                        println!("{:>12}: {}", "Last read".cyan(), last.label());
                    }
                    println!("{:>12}: {}", "Series".cyan(), entry.bookmark.series_id);
                }
                None => {
                    println!(
                        "{}  {}",
                        series.title.bold(),
                        format_date(series.updated_at).dimmed()
                    );
                    println!("{:>12}: {}", "Reading".cyan(), "not available".dimmed());
                    println!("{:>12}: {}", "Series".cyan(), entry.bookmark.series_id);
                }
            },
            Err(e) => {
                println!("{}  {}", entry.bookmark.url.bold(), "error".red());
                println!("{:>12}: {}", "Reason".cyan(), e);
            }
        }
        println!();
    }
}

/// Add a series to an existing collection
pub fn add(config: &Config, store: Option<&PathBuf>, slug: &str, url: &str) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;
    let registry = ProviderRegistry::from_config(config)?;
    let series_id = registry.series_id(url)?;

    match add_bookmark(&collection.bookmarks, Bookmark::new(series_id.as_str(), url)) {
        Ok(bookmarks) => {
            db.replace_bookmarks(slug, &bookmarks)?;
            println!("{} Added {} ({})", "✓".green(), url, series_id);
        }
        Err(CollectionError::Duplicate(_)) => {
            println!("Series with url '{}' is already in the collection.", url);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Remove a series from a collection
pub fn remove(config: &Config, store: Option<&PathBuf>, slug: &str, series_id: &str) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;

    let bookmarks = remove_bookmark(&collection.bookmarks, series_id)?;
    db.replace_bookmarks(slug, &bookmarks)?;

    println!("{} Removed {}", "✓".green(), series_id);
    Ok(())
}

/// Mark a series as read, now or through a specific chapter
pub fn mark_as_read(
    config: &Config,
    store: Option<&PathBuf>,
    slug: &str,
    series_id: &str,
    chapter: Option<&str>,
) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;

    let (bookmarks, updated) = match chapter {
        Some(chapter_id) => set_read_state(
            &collection.bookmarks,
            series_id,
            ReadState::ReadThrough {
                last_read_chapter_id: chapter_id.to_string(),
            },
        )?,
        None => mark_read(&collection.bookmarks, series_id, chrono::Utc::now().timestamp())?,
    };
    db.replace_bookmarks(slug, &bookmarks)?;

    match &updated.state {
        ReadState::ReadThrough {
            last_read_chapter_id,
        } => println!(
            "{} {} read through chapter {}",
            "✓".green(),
            series_id,
            last_read_chapter_id
        ),
        _ => println!("{} {} marked as read", "✓".green(), series_id),
    }
    Ok(())
}
