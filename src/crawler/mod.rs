//! Crawler module for survey page fetching and processing
//!
//! This module contains the scraping side of the importer:
//! - The fixed area table and area selection
//! - HTTP fetching with a per-request delay
//! - HTML parsing of area and neighborhood pages
//! - Overall run coordination

mod areas;
mod coordinator;
mod fetcher;
mod parser;

pub use areas::{Area, AreaSelector, AREA_URLS};
pub use coordinator::{run_import, Coordinator, RunOptions};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{
    parse_area_page, parse_neighborhood_page, NeighborhoodRef, ParsedNeighborhood, RejectReason,
    RejectedEntry, ScrapedImage,
};
