//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::{CollectionCount, Storage};
use crate::ImportError;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    pub total_sources: u64,
    pub total_collections: u64,
    pub total_images: u64,

    /// Image count per collection
    pub collections: Vec<CollectionCount>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(ImportError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CatalogStatistics, ImportError> {
    Ok(CatalogStatistics {
        total_sources: storage.count_sources()?,
        total_collections: storage.count_collections()?,
        total_images: storage.count_images()?,
        collections: storage.collection_image_counts()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Sources: {}", stats.total_sources);
    println!("  Collections: {}", stats.total_collections);
    println!("  Images: {}", stats.total_images);
    println!();

    if stats.collections.is_empty() {
        return;
    }

    println!("Images by Collection:");
    let mut current_source: Option<&str> = None;
    for entry in &stats.collections {
        if current_source != Some(entry.source_name.as_str()) {
            println!("  {}", entry.source_name);
            current_source = Some(entry.source_name.as_str());
        }
        println!("    {}: {}", entry.collection_name, entry.images);
    }

    let empty = stats.collections.iter().filter(|c| c.images == 0).count();
    if empty > 0 {
        println!();
        println!("Collections without images: {}", empty);
    }
}
