//! Chapter command - list the pages of a bookmarked chapter

use anyhow::{Context, Result};

use super::{find_collection, open_store, runtime};
use crate::config::Config;
use crate::providers::ProviderRegistry;

pub fn run(
    config: &Config,
    store: Option<&std::path::PathBuf>,
    slug: &str,
    series_id: &str,
    chapter_id: &str,
    json: bool,
) -> Result<()> {
    let db = open_store(config, store)?;
    let collection = find_collection(&db, slug)?;
    let bookmark = collection
        .bookmark(series_id)
        .with_context(|| format!("Series '{}' is not in collection '{}'", series_id, slug))?;

    let registry = ProviderRegistry::from_config(config)?;
    let content = runtime()?.block_on(registry.fetch_chapter(
        &bookmark.url,
        &bookmark.series_id,
        chapter_id,
    ))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
    } else {
        for page in &content.pages {
            println!("{}", page);
        }
    }
    Ok(())
}
