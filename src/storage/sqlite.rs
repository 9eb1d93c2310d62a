//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    slugify, CollectionCount, CollectionRecord, ImageRecord, NewCollection, NewImage, NewSource,
    SourceRecord,
};
use crate::ImportError;
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;

const SOURCE_COLUMNS: &str =
    "id, name, slug, url, description, public, created_at, updated_at";

const COLLECTION_COLUMNS: &str =
    "id, source_id, name, slug, url, description, public, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, collection_id, source_id, title, permalink, original_url, \
     record_url, location, year, created_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ImportError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ImportError> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Opens an existing database for lookups only
    ///
    /// No pragmas or schema are applied, and the file is never created, so
    /// a missing path is an error.
    pub fn open_read_only(path: &Path) -> Result<Self, ImportError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn source_from_row(row: &Row<'_>) -> rusqlite::Result<SourceRecord> {
    Ok(SourceRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        url: row.get(3)?,
        description: row.get(4)?,
        public: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<CollectionRecord> {
    Ok(CollectionRecord {
        id: row.get(0)?,
        source_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        url: row.get(4)?,
        description: row.get(5)?,
        public: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        collection_id: row.get(1)?,
        source_id: row.get(2)?,
        title: row.get(3)?,
        permalink: row.get(4)?,
        original_url: row.get(5)?,
        record_url: row.get(6)?,
        location: row.get(7)?,
        year: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Sources =====

    fn find_source(&self, name: &str) -> StorageResult<Option<SourceRecord>> {
        let source = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sources WHERE name = ?1", SOURCE_COLUMNS),
                params![name],
                source_from_row,
            )
            .optional()?;
        Ok(source)
    }

    fn get_or_create_source(&mut self, new: &NewSource) -> StorageResult<(SourceRecord, bool)> {
        if let Some(existing) = self.find_source(&new.name)? {
            return Ok((existing, false));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sources (name, slug, url, description, public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            params![new.name, slugify(&new.name), new.url, new.description, now],
        )?;

        let id = self.conn.last_insert_rowid();
        let created = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sources WHERE id = ?1", SOURCE_COLUMNS),
                params![id],
                source_from_row,
            )
            .optional()?
            .ok_or(StorageError::SourceNotFound(id))?;

        Ok((created, true))
    }

    // ===== Collections =====

    fn find_collection(
        &self,
        source_id: i64,
        name: &str,
    ) -> StorageResult<Option<CollectionRecord>> {
        let collection = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM collections WHERE source_id = ?1 AND name = ?2",
                    COLLECTION_COLUMNS
                ),
                params![source_id, name],
                collection_from_row,
            )
            .optional()?;
        Ok(collection)
    }

    fn get_or_create_collection(
        &mut self,
        new: &NewCollection,
    ) -> StorageResult<(CollectionRecord, bool)> {
        if let Some(existing) = self.find_collection(new.source_id, &new.name)? {
            return Ok((existing, false));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO collections
             (source_id, name, slug, url, description, public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
            params![
                new.source_id,
                new.name,
                slugify(&new.name),
                new.url,
                new.description,
                now
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        let created = self
            .conn
            .query_row(
                &format!("SELECT {} FROM collections WHERE id = ?1", COLLECTION_COLUMNS),
                params![id],
                collection_from_row,
            )
            .optional()?
            .ok_or(StorageError::CollectionNotFound(id))?;

        Ok((created, true))
    }

    // ===== Images =====

    fn image_exists(
        &self,
        source_id: i64,
        permalink: &str,
        original_url: Option<&str>,
    ) -> StorageResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM images
                 WHERE source_id = ?1
                   AND (permalink = ?2 OR (?3 IS NOT NULL AND original_url = ?3))
             )",
            params![source_id, permalink, original_url],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_image(&mut self, new: &NewImage) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO images
             (collection_id, source_id, title, permalink, original_url, record_url,
              location, year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.collection_id,
                new.source_id,
                new.title,
                new.permalink,
                new.original_url,
                new.record_url,
                new.location,
                new.year,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_image_by_permalink(
        &self,
        source_id: i64,
        permalink: &str,
    ) -> StorageResult<Option<ImageRecord>> {
        let image = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM images WHERE source_id = ?1 AND permalink = ?2",
                    IMAGE_COLUMNS
                ),
                params![source_id, permalink],
                image_from_row,
            )
            .optional()?;
        Ok(image)
    }

    // ===== Statistics =====

    fn count_sources(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sources", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_collections(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_images(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn collection_image_counts(&self) -> StorageResult<Vec<CollectionCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name, c.name, COUNT(i.id)
             FROM collections c
             JOIN sources s ON s.id = c.source_id
             LEFT JOIN images i ON i.collection_id = c.id
             GROUP BY c.id
             ORDER BY s.name, c.name",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(CollectionCount {
                    source_name: row.get(0)?,
                    collection_name: row.get(1)?,
                    images: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

/// Opens (creating if needed) a catalog database and applies the schema
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
