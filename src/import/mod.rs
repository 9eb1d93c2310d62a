//! Import module: writes scraped neighborhoods into the catalog
//!
//! The writer talks to the catalog only through the
//! [`Storage`](crate::storage::Storage) port, so it runs unchanged against
//! SQLite or any other backend.

mod writer;

pub use writer::{CollectionAction, ImageOutcome, ImportWriter, NeighborhoodReport};
