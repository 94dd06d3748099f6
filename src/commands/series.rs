//! Series command - look up one series by URL

use anyhow::Result;
use colored::Colorize;

use super::{format_date, runtime};
use crate::config::Config;
use crate::models::Series;
use crate::providers::ProviderRegistry;
use crate::reading::sorted_newest_first;

/// Fetch a series and print its chapters newest first
pub fn run(config: &Config, url: &str, json: bool, limit: Option<usize>) -> Result<()> {
    let registry = ProviderRegistry::from_config(config)?;
    let series_id = registry.series_id(url)?;

    let mut series = runtime()?.block_on(registry.fetch_series(url, &series_id))?;
    series.chapters = sorted_newest_first(&series.chapters);

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        print_series(&series, limit);
    }
    Ok(())
}

fn print_series(series: &Series, limit: Option<usize>) {
    println!("{}", series.title.bold());
    println!("{}", "─".repeat(40));
    println!("{:>12}: {}", "Id".cyan(), series.id);
    println!("{:>12}: {}", "Url".cyan(), series.url);
    println!("{:>12}: {}", "Updated".cyan(), format_date(series.updated_at));
    println!(
        "{:>12}: {}",
        "Reading".cyan(),
        if series.supports_reading {
            "available".green()
        } else {
            "not available".dimmed()
        }
    );
    println!("{:>12}: {}", "Chapters".cyan(), series.chapters.len());
    println!();

    let shown = limit.unwrap_or(series.chapters.len());
    for chapter in series.chapters.iter().take(shown) {
        let title = chapter
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!(" - {}", t))
            .unwrap_or_default();
        println!(
            "  {}  {}{}  {}",
            format_date(chapter.created_at).dimmed(),
            chapter.label(),
            title,
            chapter.id.dimmed()
        );
    }

    let hidden = series.chapters.len().saturating_sub(shown);
    if hidden > 0 {
        println!("  ... {} older chapters", hidden);
    }
}
