//! Configuration module for the importer
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file, [`Config::default`] is used.
//!
//! # Example
//!
//! ```no_run
//! use res_importer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("importer.toml")).unwrap();
//! println!("Catalog: {}", config.database.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DatabaseConfig, HttpConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
