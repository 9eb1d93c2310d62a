use crate::crawler::Area;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for the importer
///
/// Every section has defaults, so an empty file (or no file at all) yields
/// a configuration that imports from the live survey site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    /// Per-area URL overrides keyed by area letter; areas not listed use
    /// the built-in table
    pub areas: BTreeMap<Area, String>,
}

/// HTTP client and politeness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Name of the crawler, used in the User-Agent header
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Pause after every request (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Pause between areas when importing several (milliseconds)
    #[serde(rename = "area-delay-ms")]
    pub area_delay_ms: u64,

    /// Rewrite scraped `http://` links to `https://`
    #[serde(rename = "force-https")]
    pub force_https: bool,
}

impl HttpConfig {
    /// Formats the User-Agent string: `Name/Version (+ContactURL; ContactEmail)`
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            crawler_name: "res-importer".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.org/res-importer".to_string(),
            contact_email: "maintainers@example.org".to_string(),
            request_delay_ms: 500,
            area_delay_ms: 2000,
            force_https: true,
        }
    }
}

/// Catalog database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite catalog file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./catalog.db".to_string(),
        }
    }
}

/// Metadata written for the source and its collections
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub description: String,

    /// Description given to each newly created neighborhood collection
    #[serde(rename = "collection-description")]
    pub collection_description: String,

    /// Year assigned to images whose caption carries no year
    #[serde(rename = "survey-year")]
    pub survey_year: i32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "Library of Virginia".to_string(),
            url: "https://image.lva.virginia.gov/".to_string(),
            description: "The Library of Virginia is the archival agency and reference library \
                for Virginia's government, housing the most comprehensive collection of \
                materials on Virginia history."
                .to_string(),
            collection_description: "Part of the 1965 Richmond Esthetic Survey and Historic \
                Building Survey, documenting buildings and locations across Richmond."
                .to_string(),
            survey_year: 1965,
        }
    }
}

impl Config {
    /// Returns the area page URL for `area`, honoring overrides
    pub fn area_url(&self, area: Area) -> &str {
        self.areas
            .get(&area)
            .map(String::as_str)
            .unwrap_or_else(|| area.default_url())
    }
}
