//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and
//! associated error types.

use crate::storage::{
    CollectionCount, CollectionRecord, ImageRecord, NewCollection, NewImage, NewSource,
    SourceRecord,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Source not found: {0}")]
    SourceNotFound(i64),

    #[error("Collection not found: {0}")]
    CollectionNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::ConstraintViolation(
                    message.unwrap_or_else(|| code.to_string()),
                )
            }
            other => StorageError::Sqlite(other),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog backend implementations
///
/// This is everything the import writer asks of the catalog. Lookups take
/// `&self` so dry runs can hold a shared borrow; creations take `&mut self`.
pub trait Storage {
    // ===== Sources =====

    /// Finds a source by its unique name
    fn find_source(&self, name: &str) -> StorageResult<Option<SourceRecord>>;

    /// Gets the source named `new.name`, creating it if absent
    ///
    /// # Returns
    ///
    /// The source and whether it was created by this call
    fn get_or_create_source(&mut self, new: &NewSource) -> StorageResult<(SourceRecord, bool)>;

    // ===== Collections =====

    /// Finds a collection by name within a source
    fn find_collection(
        &self,
        source_id: i64,
        name: &str,
    ) -> StorageResult<Option<CollectionRecord>>;

    /// Gets the collection `(new.source_id, new.name)`, creating it if absent
    fn get_or_create_collection(
        &mut self,
        new: &NewCollection,
    ) -> StorageResult<(CollectionRecord, bool)>;

    // ===== Images =====

    /// Checks whether the source already holds an image with this permalink,
    /// or one imported from the same original URL
    fn image_exists(
        &self,
        source_id: i64,
        permalink: &str,
        original_url: Option<&str>,
    ) -> StorageResult<bool>;

    /// Creates an image and returns its ID
    ///
    /// Fails with [`StorageError::ConstraintViolation`] if the permalink is
    /// already taken within the source.
    fn create_image(&mut self, new: &NewImage) -> StorageResult<i64>;

    /// Gets an image by permalink within a source
    fn get_image_by_permalink(
        &self,
        source_id: i64,
        permalink: &str,
    ) -> StorageResult<Option<ImageRecord>>;

    // ===== Statistics =====

    fn count_sources(&self) -> StorageResult<u64>;

    fn count_collections(&self) -> StorageResult<u64>;

    fn count_images(&self) -> StorageResult<u64>;

    /// Image counts per collection, ordered by source then collection name
    fn collection_image_counts(&self) -> StorageResult<Vec<CollectionCount>>;
}
