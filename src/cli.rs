use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookshelfctl")]
#[command(about = "Track reading progress across manga providers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Collection database to use instead of the configured one
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, view and edit collections
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Look up a series by URL and list its chapters
    Series {
        /// Series URL at a supported provider
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show at most this many chapters
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the pages of one chapter of a bookmarked series
    Chapter {
        /// Collection slug
        slug: String,

        /// Series id within the collection
        series_id: String,

        /// Chapter id from `series` output
        chapter_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert timestamp bookmarks into chapter bookmarks
    Migrate {
        /// Collection slug
        slug: String,

        /// Actually write the results (default: dry-run)
        #[arg(long)]
        no_dry_run: bool,

        /// Pause between provider requests in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// Create a collection from series URLs
    New {
        /// Display name
        name: String,

        /// Series URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show a collection, most recently updated series first
    Show {
        /// Collection slug
        slug: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a series to a collection
    Add {
        /// Collection slug
        slug: String,

        /// Series URL
        url: String,
    },

    /// Remove a series from a collection
    Remove {
        /// Collection slug
        slug: String,

        /// Series id to remove
        series_id: String,
    },

    /// Mark a series as read
    MarkRead {
        /// Collection slug
        slug: String,

        /// Series id to mark
        series_id: String,

        /// Read through this chapter instead of "as of now"
        #[arg(long)]
        chapter: Option<String>,
    },
}
