pub mod chapter;
pub mod collection;
pub mod migrate;
pub mod series;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::database::{CollectionStore, ShelfDb};
use crate::models::Collection;

/// Open the collection store, honoring a --store override
fn open_store(config: &Config, store_override: Option<&PathBuf>) -> Result<ShelfDb> {
    let path = config.store_path(store_override)?;
    ShelfDb::open(&path)
}

/// Look up a collection or fail with a readable message
fn find_collection(db: &impl CollectionStore, slug: &str) -> Result<Collection> {
    db.find(slug)?
        .with_context(|| format!("Collection '{}' not found", slug))
}

/// Runtime for the async provider calls
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}

/// Format a unix timestamp as a UTC date
fn format_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(1_672_876_800), "2023-01-05");
        assert_eq!(format_date(i64::MAX), "unknown");
    }
}
