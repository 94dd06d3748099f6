//! SQLite storage for collections and their bookmarks

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::models::{Bookmark, Collection, ReadState};

/// Storage the core hands finished bookmark sequences to
pub trait CollectionStore {
    fn create(&self, collection: &Collection) -> Result<()>;

    fn find(&self, slug: &str) -> Result<Option<Collection>>;

    /// Swap the whole bookmark list for a collection in one transaction
    fn replace_bookmarks(&self, slug: &str, bookmarks: &[Bookmark]) -> Result<()>;

    /// Write a single bookmark's read state
    fn update_bookmark(&self, slug: &str, bookmark: &Bookmark) -> Result<()>;
}

/// Database handle for the collection store
pub struct ShelfDb {
    conn: Connection,
}

impl ShelfDb {
    /// Open or create the database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database, for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS collections (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bookmarks (
                collection_slug TEXT NOT NULL REFERENCES collections(slug) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                series_id TEXT NOT NULL,
                url TEXT NOT NULL,
                last_read_at INTEGER,
                last_read_chapter_id TEXT,
                PRIMARY KEY (collection_slug, series_id)
            );

            CREATE INDEX IF NOT EXISTS idx_bookmarks_position
                ON bookmarks(collection_slug, position);
            "#,
        )?;
        Ok(())
    }

    fn load_bookmarks(&self, slug: &str) -> Result<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT series_id, url, last_read_at, last_read_chapter_id
            FROM bookmarks
            WHERE collection_slug = ?1
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map(params![slug], |row| {
            Ok(Bookmark {
                series_id: row.get(0)?,
                url: row.get(1)?,
                state: state_from_columns(row.get(2)?, row.get(3)?),
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to collect bookmarks")
    }

    fn insert_bookmarks(conn: &Connection, slug: &str, bookmarks: &[Bookmark]) -> Result<()> {
        let mut stmt = conn.prepare(
            r#"
            INSERT INTO bookmarks (
                collection_slug, position, series_id, url, last_read_at, last_read_chapter_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;

        for (position, bookmark) in bookmarks.iter().enumerate() {
            let (last_read_at, chapter_id) = state_columns(&bookmark.state);
            stmt.execute(params![
                slug,
                position as i64,
                bookmark.series_id,
                bookmark.url,
                last_read_at,
                chapter_id,
            ])
            .with_context(|| format!("Failed to store bookmark {}", bookmark.series_id))?;
        }
        Ok(())
    }
}

impl CollectionStore for ShelfDb {
    fn create(&self, collection: &Collection) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let now = chrono::Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO collections (slug, name, created_at) VALUES (?1, ?2, ?3)",
            params![collection.slug, collection.name, now],
        )
        .with_context(|| format!("Failed to create collection {}", collection.slug))?;
        Self::insert_bookmarks(&tx, &collection.slug, &collection.bookmarks)?;

        tx.commit()?;
        Ok(())
    }

    fn find(&self, slug: &str) -> Result<Option<Collection>> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM collections WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query collection")?;

        match name {
            Some(name) => Ok(Some(Collection {
                slug: slug.to_string(),
                name,
                bookmarks: self.load_bookmarks(slug)?,
            })),
            None => Ok(None),
        }
    }

    fn replace_bookmarks(&self, slug: &str, bookmarks: &[Bookmark]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM collections WHERE slug = ?1)",
                params![slug],
                |row| row.get(0),
            )
            .context("Failed to query collection")?;
        if !exists {
            bail!("Collection '{}' not found", slug);
        }

        tx.execute(
            "DELETE FROM bookmarks WHERE collection_slug = ?1",
            params![slug],
        )?;
        Self::insert_bookmarks(&tx, slug, bookmarks)?;

        tx.commit()?;
        Ok(())
    }

    fn update_bookmark(&self, slug: &str, bookmark: &Bookmark) -> Result<()> {
        let (last_read_at, chapter_id) = state_columns(&bookmark.state);
        let changed = self
            .conn
            .execute(
                r#"
                UPDATE bookmarks
                SET last_read_at = ?1, last_read_chapter_id = ?2
                WHERE collection_slug = ?3 AND series_id = ?4
                "#,
                params![last_read_at, chapter_id, slug, bookmark.series_id],
            )
            .with_context(|| format!("Failed to update bookmark {}", bookmark.series_id))?;

        if changed == 0 {
            bail!(
                "Series '{}' not found in collection '{}'",
                bookmark.series_id,
                slug
            );
        }
        Ok(())
    }
}

fn state_columns(state: &ReadState) -> (Option<i64>, Option<&str>) {
    match state {
        ReadState::Unread => (None, None),
        ReadState::ReadAt { last_read_at } => (Some(*last_read_at), None),
        ReadState::ReadThrough {
            last_read_chapter_id,
        } => (None, Some(last_read_chapter_id.as_str())),
    }
}

/// A stored chapter id wins over a stored timestamp
fn state_from_columns(last_read_at: Option<i64>, chapter_id: Option<String>) -> ReadState {
    match (chapter_id, last_read_at) {
        (Some(last_read_chapter_id), _) => ReadState::ReadThrough {
            last_read_chapter_id,
        },
        (None, Some(last_read_at)) => ReadState::ReadAt { last_read_at },
        (None, None) => ReadState::Unread,
    }
}
