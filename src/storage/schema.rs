//! Database schema definitions
//!
//! This module contains the SQL schema for the image catalog. The tables
//! follow the georeferencing application's source/collection/image models.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Archive sources
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    slug TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    description TEXT NOT NULL,
    public INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Collections within a source (one per surveyed neighborhood)
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    url TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    public INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(source_id, name)
);

CREATE INDEX IF NOT EXISTS idx_collections_source ON collections(source_id);

-- Images; permalinks are unique within a source
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    permalink TEXT NOT NULL,
    original_url TEXT,
    record_url TEXT,
    location TEXT,
    year INTEGER CHECK (year IS NULL OR year BETWEEN 1800 AND 2100),
    created_at TEXT NOT NULL,
    UNIQUE(source_id, permalink)
);

CREATE INDEX IF NOT EXISTS idx_images_collection ON images(collection_id);
CREATE INDEX IF NOT EXISTS idx_images_original_url ON images(source_id, original_url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
