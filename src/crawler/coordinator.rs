//! Crawler coordinator - main import orchestration logic
//!
//! This module walks the survey for the selected areas:
//! - Fetching each area page and reading its neighborhood dropdown
//! - Fetching each neighborhood page and extracting its image entries
//! - Handing the entries to the import writer
//! - Tallying everything into a [`RunSummary`]
//!
//! Network and parse failures skip the affected area or neighborhood; the
//! run only fails outright when no requested area could be reached.

use crate::config::Config;
use crate::crawler::parser::{parse_area_page, parse_neighborhood_page};
use crate::crawler::{Area, AreaSelector, Fetcher, NeighborhoodRef, ParsedNeighborhood};
use crate::import::ImportWriter;
use crate::output::RunSummary;
use crate::state::{ScrapeState, Tracked};
use crate::storage::{SqliteStorage, Storage};
use crate::ImportError;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Per-run switches taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Look everything up but write nothing
    pub dry_run: bool,
    /// Neighborhoods processed per area
    pub max_neighborhoods: Option<usize>,
    /// Images imported per neighborhood
    pub max_images: Option<usize>,
}

/// Main import coordinator structure
pub struct Coordinator<S: Storage> {
    config: Config,
    fetcher: Fetcher,
    writer: ImportWriter<S>,
    options: RunOptions,
    area_delay: Duration,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The importer configuration
    /// * `storage` - The catalog to import into
    /// * `options` - Dry-run flag and limits for this run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ImportError)` - The HTTP client could not be built
    pub fn new(config: Config, storage: S, options: RunOptions) -> Result<Self, ImportError> {
        let fetcher = Fetcher::from_config(&config.http)?;
        let writer = ImportWriter::new(storage, config.source.clone(), options.dry_run);
        let area_delay = Duration::from_millis(config.http.area_delay_ms);

        Ok(Self {
            config,
            fetcher,
            writer,
            options,
            area_delay,
        })
    }

    /// Hands the catalog back once the run is over
    pub fn into_storage(self) -> S {
        self.writer.into_storage()
    }

    /// Runs the import for the selected areas, in table order
    pub async fn run(&mut self, selector: AreaSelector) -> Result<RunSummary, ImportError> {
        let areas = selector.areas();
        let mut summary = RunSummary::new(self.writer.is_dry_run());

        tracing::info!(
            "Starting import of area {} ({} area(s){})",
            selector,
            areas.len(),
            if self.options.dry_run { ", dry run" } else { "" }
        );

        self.writer.prepare_source()?;

        for (position, area) in areas.iter().copied().enumerate() {
            if position > 0 && !self.area_delay.is_zero() {
                tracing::debug!("Waiting {:?} before area {}", self.area_delay, area);
                tokio::time::sleep(self.area_delay).await;
            }

            summary.areas_visited.push(area);
            let mut tracked = Tracked::new(area);
            self.process_area(&mut tracked, &mut summary).await?;

            match tracked.state() {
                ScrapeState::Completed => summary.areas_processed += 1,
                _ => summary.areas_skipped += 1,
            }
        }

        if summary.areas_processed == 0 {
            tracing::error!("None of the {} requested area(s) could be reached", areas.len());
            return Err(ImportError::NoAreasReachable {
                attempted: areas.len(),
            });
        }

        tracing::info!(
            "Import complete: {} area(s), {} neighborhood(s), {} image(s) {}, {} duplicate, {} malformed, {} failed",
            summary.areas_processed,
            summary.neighborhoods_processed,
            summary.images_imported(),
            if summary.dry_run { "would be created" } else { "created" },
            summary.images_duplicate,
            summary.images_malformed,
            summary.images_failed
        );

        Ok(summary)
    }

    /// Processes one area, leaving it Completed or Skipped
    ///
    /// Only a broken state transition is returned as an error.
    async fn process_area(
        &mut self,
        tracked: &mut Tracked<Area>,
        summary: &mut RunSummary,
    ) -> Result<(), ImportError> {
        let area = tracked.item;
        tracked.transition(ScrapeState::Fetching)?;

        let neighborhoods = match self.load_area(area).await {
            Ok(neighborhoods) => neighborhoods,
            Err(e) => {
                tracing::warn!("Skipping area {}: {}", area, e);
                return tracked.transition(ScrapeState::Skipped);
            }
        };
        tracked.transition(ScrapeState::Importing)?;

        tracing::info!("Area {}: {} neighborhood(s) found", area, neighborhoods.len());

        let mut neighborhoods: Vec<Tracked<NeighborhoodRef>> =
            neighborhoods.into_iter().map(Tracked::new).collect();

        if let Some(limit) = self.options.max_neighborhoods {
            if neighborhoods.len() > limit {
                tracing::info!(
                    "Limiting area {} to {} of {} neighborhood(s)",
                    area,
                    limit,
                    neighborhoods.len()
                );
            }
            for neighborhood in neighborhoods.iter_mut().skip(limit) {
                neighborhood.transition(ScrapeState::LimitSkipped)?;
                summary.neighborhoods_limited += 1;
            }
        }

        let total = neighborhoods.len();
        for (position, neighborhood) in neighborhoods.iter_mut().enumerate() {
            if neighborhood.state() != ScrapeState::Pending {
                continue;
            }
            tracing::info!(
                "[{}/{}] Processing neighborhood: {}",
                position + 1,
                total,
                neighborhood.item.name
            );
            self.process_neighborhood(neighborhood, summary).await?;
        }

        tracked.transition(ScrapeState::Completed)
    }

    /// Fetches and parses an area page
    async fn load_area(&self, area: Area) -> Result<Vec<NeighborhoodRef>, ImportError> {
        let url = self.config.area_url(area);
        tracing::info!("Fetching area {}: {}", area, url);

        let html = self.fetcher.fetch_page(url).await?;
        let base = Url::parse(url)?;
        parse_area_page(&html, &base, self.config.http.force_https).map_err(|message| {
            ImportError::HtmlParse {
                url: url.to_string(),
                message,
            }
        })
    }

    /// Processes one neighborhood, leaving it Completed or Skipped
    async fn process_neighborhood(
        &mut self,
        tracked: &mut Tracked<NeighborhoodRef>,
        summary: &mut RunSummary,
    ) -> Result<(), ImportError> {
        tracked.transition(ScrapeState::Fetching)?;

        let mut parsed = match self.load_neighborhood(&tracked.item).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping neighborhood {}: {}", tracked.item.name, e);
                summary.neighborhoods_skipped += 1;
                return tracked.transition(ScrapeState::Skipped);
            }
        };
        tracked.transition(ScrapeState::Importing)?;

        for rejected in &parsed.rejected {
            tracing::warn!(
                "Malformed entry #{} in {} ({}): {}",
                rejected.index,
                tracked.item.name,
                rejected.href,
                rejected.reason
            );
        }
        summary.images_malformed += parsed.rejected.len();

        if let Some(limit) = self.options.max_images {
            if parsed.images.len() > limit {
                tracing::info!(
                    "Limiting {} to {} of {} image(s)",
                    tracked.item.name,
                    limit,
                    parsed.images.len()
                );
                parsed.images.truncate(limit);
            }
        }

        tracing::info!("Found {} image(s) in {}", parsed.images.len(), tracked.item.name);

        match self.writer.import_neighborhood(&tracked.item, &parsed.images) {
            Ok(report) => {
                summary.record_neighborhood(&report);
                tracked.transition(ScrapeState::Completed)
            }
            Err(e) => {
                tracing::error!("Skipping neighborhood {}: {}", tracked.item.name, e);
                summary.neighborhoods_skipped += 1;
                tracked.transition(ScrapeState::Skipped)
            }
        }
    }

    /// Fetches and parses a neighborhood page
    async fn load_neighborhood(
        &self,
        neighborhood: &NeighborhoodRef,
    ) -> Result<ParsedNeighborhood, ImportError> {
        let html = self.fetcher.fetch_page(&neighborhood.url).await?;
        let base = Url::parse(&neighborhood.url)?;
        Ok(parse_neighborhood_page(
            &html,
            &base,
            self.config.http.force_https,
            self.config.source.survey_year,
        ))
    }
}

/// Runs a complete import against the configured SQLite catalog
///
/// Opens (or creates) the database at `config.database.path`, walks the
/// selected areas and returns the run summary. A dry run opens the catalog
/// read-only, or looks up against an empty in-memory catalog when the file
/// does not exist yet, so the path is left untouched.
///
/// # Example
///
/// ```no_run
/// use res_importer::config::Config;
/// use res_importer::crawler::{run_import, RunOptions};
/// use res_importer::AreaSelector;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = RunOptions {
///     dry_run: true,
///     ..RunOptions::default()
/// };
/// let summary = run_import(Config::default(), AreaSelector::All, options).await?;
/// println!("{} image(s) would be created", summary.images_would_create);
/// # Ok(())
/// # }
/// ```
pub async fn run_import(
    config: Config,
    selector: AreaSelector,
    options: RunOptions,
) -> Result<RunSummary, ImportError> {
    let path = Path::new(&config.database.path);
    let storage = if !options.dry_run {
        SqliteStorage::new(path)?
    } else if path.exists() {
        SqliteStorage::open_read_only(path)?
    } else {
        tracing::info!(
            "Catalog {} does not exist yet, dry run starts from an empty catalog",
            path.display()
        );
        SqliteStorage::new_in_memory()?
    };
    let mut coordinator = Coordinator::new(config, storage, options)?;
    coordinator.run(selector).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.http.request_delay_ms = 0;
        config.http.area_delay_ms = 0;
        config.http.force_https = false;
        for area in Area::ALL {
            config.areas.insert(
                area,
                format!("{}/area/{}", server.uri(), area.as_str().to_lowercase()),
            );
        }
        config
    }

    fn area_page(neighborhoods: &[(&str, &str)]) -> String {
        let options: String = neighborhoods
            .iter()
            .map(|(value, name)| format!("<option value=\"{}\">{}</option>", value, name))
            .collect();
        format!(
            "<html><body><select name=\"neighborhoods\">\
             <option value=\"\">Select a neighborhood</option>{}</select></body></html>",
            options
        )
    }

    fn neighborhood_page(entries: &[(&str, &str)]) -> String {
        let cells: String = entries
            .iter()
            .map(|(file, title)| {
                format!(
                    "<tr><td><a href=\"/RES/access/sp/{}\"><img src=\"/thumbs/{}\"></a><br>{}</td></tr>",
                    file, file, title
                )
            })
            .collect();
        format!("<html><body><table>{}</table></body></html>", cells)
    }

    async fn mount_html(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_single_area_imports_images() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/area/a",
            area_page(&[("/hood/a001", "Monument Ave. (A001)")]),
        )
        .await;
        mount_html(
            &server,
            "/hood/a001",
            neighborhood_page(&[("A001-01.jpg", "Monument Ave."), ("A001-02.jpg", "Lee Circle")]),
        )
        .await;

        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut coordinator =
            Coordinator::new(create_test_config(&server), storage, RunOptions::default()).unwrap();
        let summary = coordinator.run(AreaSelector::Single(Area::A)).await.unwrap();

        assert_eq!(summary.areas_processed, 1);
        assert_eq!(summary.neighborhoods_processed, 1);
        assert_eq!(summary.images_created, 2);

        let storage = coordinator.into_storage();
        assert_eq!(storage.count_images().unwrap(), 2);
        assert_eq!(storage.count_collections().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_dropdown_skips_area() {
        let server = MockServer::start().await;
        mount_html(&server, "/area/a", "<html><body>Maintenance</body></html>".into()).await;

        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut coordinator =
            Coordinator::new(create_test_config(&server), storage, RunOptions::default()).unwrap();
        let err = coordinator
            .run(AreaSelector::Single(Area::A))
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::NoAreasReachable { attempted: 1 }));
    }

    #[tokio::test]
    async fn test_neighborhood_failure_is_skipped() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/area/b",
            area_page(&[("/hood/b001", "Church Hill (B001)"), ("/hood/b002", "Fulton (B002)")]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/hood/b001"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_html(
            &server,
            "/hood/b002",
            neighborhood_page(&[("B002-01.jpg", "Fulton Gas Works")]),
        )
        .await;

        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut coordinator =
            Coordinator::new(create_test_config(&server), storage, RunOptions::default()).unwrap();
        let summary = coordinator.run(AreaSelector::Single(Area::B)).await.unwrap();

        assert_eq!(summary.neighborhoods_skipped, 1);
        assert_eq!(summary.neighborhoods_processed, 1);
        assert_eq!(summary.images_created, 1);
    }

    #[tokio::test]
    async fn test_limits_apply() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/area/c",
            area_page(&[("/hood/c001", "Fan (C001)"), ("/hood/c002", "Museum (C002)")]),
        )
        .await;
        mount_html(
            &server,
            "/hood/c001",
            neighborhood_page(&[
                ("C001-01.jpg", "Park Ave."),
                ("C001-02.jpg", "Floyd Ave."),
                ("C001-03.jpg", "Grove Ave."),
            ]),
        )
        .await;

        let options = RunOptions {
            dry_run: false,
            max_neighborhoods: Some(1),
            max_images: Some(2),
        };
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut coordinator =
            Coordinator::new(create_test_config(&server), storage, options).unwrap();
        let summary = coordinator.run(AreaSelector::Single(Area::C)).await.unwrap();

        assert_eq!(summary.neighborhoods_processed, 1);
        assert_eq!(summary.neighborhoods_limited, 1);
        assert_eq!(summary.images_created, 2);
    }
}
