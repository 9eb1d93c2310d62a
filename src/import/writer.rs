//! Import writer
//!
//! For each neighborhood the writer ensures a collection exists under the
//! fixed source, then creates every image whose permalink the source does
//! not already hold. In dry-run mode every lookup still runs but nothing is
//! written.

use crate::config::SourceConfig;
use crate::crawler::{NeighborhoodRef, ScrapedImage};
use crate::storage::{NewCollection, NewImage, NewSource, SourceRecord, Storage, StorageError};
use crate::ImportError;
use std::collections::HashSet;

/// What happened to a single scraped image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Created with the given catalog ID
    Created(i64),
    /// Dry run: would have been created
    WouldCreate,
    /// Permalink (or original URL) already present for the source
    Duplicate,
    /// The catalog rejected the write; logged and passed over
    Failed,
}

/// What happened to the neighborhood's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAction {
    Existing,
    Created,
    WouldCreate,
}

/// Per-neighborhood tally returned by [`ImportWriter::import_neighborhood`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodReport {
    pub collection: CollectionAction,
    pub created: usize,
    pub would_create: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl NeighborhoodReport {
    fn new(collection: CollectionAction) -> Self {
        Self {
            collection,
            created: 0,
            would_create: 0,
            duplicates: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: ImageOutcome) {
        match outcome {
            ImageOutcome::Created(_) => self.created += 1,
            ImageOutcome::WouldCreate => self.would_create += 1,
            ImageOutcome::Duplicate => self.duplicates += 1,
            ImageOutcome::Failed => self.failed += 1,
        }
    }
}

/// Writes scraped neighborhoods into a catalog
pub struct ImportWriter<S: Storage> {
    storage: S,
    source_config: SourceConfig,
    dry_run: bool,
    prepared: bool,
    source: Option<SourceRecord>,
    /// Permalinks a dry run has already counted as new
    planned: HashSet<String>,
}

impl<S: Storage> ImportWriter<S> {
    pub fn new(storage: S, source_config: SourceConfig, dry_run: bool) -> Self {
        Self {
            storage,
            source_config,
            dry_run,
            prepared: false,
            source: None,
            planned: HashSet::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Resolves the fixed source, creating it unless this is a dry run
    ///
    /// Safe to call repeatedly; the lookup happens once per writer.
    pub fn prepare_source(&mut self) -> Result<Option<&SourceRecord>, ImportError> {
        if !self.prepared {
            self.source = if self.dry_run {
                let found = self.storage.find_source(&self.source_config.name)?;
                match &found {
                    Some(source) => tracing::info!("Using existing source: {}", source.name),
                    None => tracing::info!(
                        "Would create source: {} (dry run)",
                        self.source_config.name
                    ),
                }
                found
            } else {
                let (source, created) = self.storage.get_or_create_source(&NewSource {
                    name: self.source_config.name.clone(),
                    url: self.source_config.url.clone(),
                    description: self.source_config.description.clone(),
                })?;
                if created {
                    tracing::info!("Created source: {}", source.name);
                } else {
                    tracing::info!("Using existing source: {}", source.name);
                }
                Some(source)
            };
            self.prepared = true;
        }
        Ok(self.source.as_ref())
    }

    /// Imports one neighborhood's images
    ///
    /// A persistence failure on the source or collection is returned so the
    /// caller can skip the neighborhood. Failures on individual images are
    /// logged and counted in the report.
    pub fn import_neighborhood(
        &mut self,
        neighborhood: &NeighborhoodRef,
        images: &[ScrapedImage],
    ) -> Result<NeighborhoodReport, ImportError> {
        let source_id = self.prepare_source()?.map(|source| source.id);
        let (collection_id, action) = self.ensure_collection(source_id, neighborhood)?;

        let mut report = NeighborhoodReport::new(action);
        for (position, image) in images.iter().enumerate() {
            tracing::debug!("[{}/{}] {}", position + 1, images.len(), image.title);
            let outcome = self.import_image(source_id, collection_id, image);
            report.record(outcome);
        }

        Ok(report)
    }

    fn ensure_collection(
        &mut self,
        source_id: Option<i64>,
        neighborhood: &NeighborhoodRef,
    ) -> Result<(Option<i64>, CollectionAction), ImportError> {
        if self.dry_run {
            let existing = match source_id {
                Some(id) => self.storage.find_collection(id, &neighborhood.name)?,
                None => None,
            };
            return Ok(match existing {
                Some(collection) => {
                    tracing::info!("Using existing collection: {}", collection.name);
                    (Some(collection.id), CollectionAction::Existing)
                }
                None => {
                    tracing::info!("Would create collection: {} (dry run)", neighborhood.name);
                    (None, CollectionAction::WouldCreate)
                }
            });
        }

        let source_id = source_id.ok_or_else(|| {
            ImportError::Storage(StorageError::Database(format!(
                "source '{}' is not available",
                self.source_config.name
            )))
        })?;

        let (collection, created) = self.storage.get_or_create_collection(&NewCollection {
            source_id,
            name: neighborhood.name.clone(),
            url: neighborhood.url.clone(),
            description: self.source_config.collection_description.clone(),
        })?;

        if created {
            tracing::info!("Created collection: {}", collection.name);
            Ok((Some(collection.id), CollectionAction::Created))
        } else {
            tracing::info!("Using existing collection: {}", collection.name);
            Ok((Some(collection.id), CollectionAction::Existing))
        }
    }

    fn import_image(
        &mut self,
        source_id: Option<i64>,
        collection_id: Option<i64>,
        image: &ScrapedImage,
    ) -> ImageOutcome {
        if let Some(source_id) = source_id {
            match self
                .storage
                .image_exists(source_id, &image.permalink, Some(image.image_url.as_str()))
            {
                Ok(true) => {
                    tracing::info!("Duplicate, skipping: {}", image.permalink);
                    return ImageOutcome::Duplicate;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Lookup failed for {}: {}", image.permalink, e);
                    return ImageOutcome::Failed;
                }
            }
        }

        if self.dry_run {
            if !self.planned.insert(image.permalink.clone()) {
                tracing::info!("Duplicate, skipping: {}", image.permalink);
                return ImageOutcome::Duplicate;
            }
            tracing::info!("Would create image: {} (dry run)", image.permalink);
            return ImageOutcome::WouldCreate;
        }

        let (Some(source_id), Some(collection_id)) = (source_id, collection_id) else {
            tracing::error!("No collection for {}, skipping", image.permalink);
            return ImageOutcome::Failed;
        };

        let new_image = NewImage {
            collection_id,
            source_id,
            title: image.title.clone(),
            permalink: image.permalink.clone(),
            original_url: Some(image.image_url.clone()),
            record_url: image.record_url.clone(),
            location: image.location.clone(),
            year: Some(image.year),
        };

        match self.storage.create_image(&new_image) {
            Ok(id) => {
                tracing::info!("Created image {}: {}", id, image.title);
                ImageOutcome::Created(id)
            }
            Err(e) => {
                tracing::error!("Failed to create image {}: {}", image.permalink, e);
                ImageOutcome::Failed
            }
        }
    }
}
