//! Storage module for the image catalog
//!
//! This module is the importer's persistence port:
//! - The [`Storage`] trait lists the catalog operations the import writer needs
//! - [`SqliteStorage`] implements it on a SQLite database
//! - Record types mirror the catalog's sources, collections and images

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{init_database, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

/// An archive source, e.g. the Library of Virginia
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub description: String,
    pub public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A collection of images within a source (one per neighborhood)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub id: i64,
    pub source_id: i64,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub description: String,
    pub public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A catalogued image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: i64,
    pub collection_id: i64,
    pub source_id: i64,
    pub title: String,
    pub permalink: String,
    pub original_url: Option<String>,
    pub record_url: Option<String>,
    pub location: Option<String>,
    pub year: Option<i32>,
    pub created_at: String,
}

/// Fields for a source created by the importer
#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Fields for a collection created by the importer
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub source_id: i64,
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Fields for an image created by the importer
#[derive(Debug, Clone)]
pub struct NewImage {
    pub collection_id: i64,
    pub source_id: i64,
    pub title: String,
    pub permalink: String,
    pub original_url: Option<String>,
    pub record_url: Option<String>,
    pub location: Option<String>,
    pub year: Option<i32>,
}

/// Image count for one collection, for `--stats`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCount {
    pub source_name: String,
    pub collection_name: String,
    pub images: u64,
}

/// Builds a URL slug: lowercase ASCII alphanumerics separated by single hyphens
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_hyphen = true;
        }
    }

    slug
}
