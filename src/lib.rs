//! RES Importer: Richmond Esthetic Survey scraper and catalog importer
//!
//! This crate scrapes the Library of Virginia's 1965 Richmond Esthetic Survey
//! (area pages, neighborhood pages, image entries) and imports the images into
//! a georeferencing catalog through the [`storage::Storage`] port.

pub mod config;
pub mod crawler;
pub mod import;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for importer operations
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::ScrapeState,
        to: state::ScrapeState,
    },

    #[error("None of the requested areas could be reached ({attempted} attempted)")]
    NoAreasReachable { attempted: usize },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for importer operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Area, AreaSelector};
pub use state::ScrapeState;
