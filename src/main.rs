mod aggregate;
mod cli;
mod collection;
mod commands;
mod config;
mod database;
mod error;
mod models;
mod providers;
mod reading;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, CollectionCommands, Commands};
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let store = cli.store.as_ref();

    match cli.command {
        Commands::Collection { command } => match command {
            CollectionCommands::New { name, urls } => {
                commands::collection::new(&config, store, &name, &urls)?;
            }
            CollectionCommands::Show { slug, json } => {
                commands::collection::show(&config, store, &slug, json, cli.quiet)?;
            }
            CollectionCommands::Add { slug, url } => {
                commands::collection::add(&config, store, &slug, &url)?;
            }
            CollectionCommands::Remove { slug, series_id } => {
                commands::collection::remove(&config, store, &slug, &series_id)?;
            }
            CollectionCommands::MarkRead {
                slug,
                series_id,
                chapter,
            } => {
                commands::collection::mark_as_read(
                    &config,
                    store,
                    &slug,
                    &series_id,
                    chapter.as_deref(),
                )?;
            }
        },
        Commands::Series { url, json, limit } => {
            commands::series::run(&config, &url, json, limit)?;
        }
        Commands::Chapter {
            slug,
            series_id,
            chapter_id,
            json,
        } => {
            commands::chapter::run(&config, store, &slug, &series_id, &chapter_id, json)?;
        }
        Commands::Migrate {
            slug,
            no_dry_run,
            delay_ms,
        } => {
            commands::migrate::run(&config, store, &slug, no_dry_run, delay_ms)?;
        }
    }

    Ok(())
}
