//! State module for tracking import progress
//!
//! Areas and neighborhoods move through the same small lifecycle while a
//! run walks the survey.
//!
//! # Components
//!
//! - `ScrapeState`: Tracks the state of one area or neighborhood

mod scrape_state;

pub use scrape_state::{ScrapeState, Tracked};
