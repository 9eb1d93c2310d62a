//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the importer:
//! - Building the HTTP client with a descriptive user agent
//! - GET requests for area and neighborhood pages
//! - A fixed pause after every request to stay gentle on the survey server

use crate::config::HttpConfig;
use crate::ImportError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// The user agent follows `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Example
///
/// ```no_run
/// use res_importer::config::HttpConfig;
/// use res_importer::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sequential page fetcher with an inter-request delay
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Builds a fetcher from the HTTP section of the configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, ImportError> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            client,
            Duration::from_millis(config.request_delay_ms),
        ))
    }

    /// Fetches `url` and returns the response body
    ///
    /// Transport failures and timeouts map to [`ImportError::Http`], non-2xx
    /// responses to [`ImportError::HttpStatus`]. The configured delay is
    /// observed whether or not the request succeeded.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ImportError> {
        tracing::debug!("GET {}", url);
        let result = self.get_text(url).await;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        result
    }

    async fn get_text(&self, url: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ImportError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ImportError::Http {
            url: url.to_string(),
            source,
        })
    }
}
