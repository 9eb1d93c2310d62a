use res_importer::config::Config;
use res_importer::crawler::{run_import, Area, AreaSelector, RunOptions};
use res_importer::storage::{SqliteStorage, Storage};
use res_importer::ImportError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every area at the mock server
fn create_test_config(server: &MockServer, db_path: &Path) -> Config {
    let mut config = Config::default();
    config.http.crawler_name = "TestBot".to_string();
    config.http.request_delay_ms = 0;
    config.http.area_delay_ms = 0;
    config.http.force_https = false;
    config.database.path = db_path.display().to_string();
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
        .map(|(value, name)| format!(r#"<option value="{}">{}</option>"#, value, name))
        .collect();
    format!(
        r#"<html><body><form>
        <select name="neighborhoods">
            <option value="">Select a Neighborhood</option>
            {}
        </select>
        </form></body></html>"#,
        options
    )
}

/// One table cell per entry: thumbnail link, caption lines, record link
fn image_cell(href: &str, caption: &str) -> String {
    format!(
        r#"<td>
            <a href="{href}"><img src="/thumbs/t.jpg"></a><br>
            {caption}<br>
            <a href="/cgi-bin/record?id=1">Photo Record</a>
        </td>"#,
        href = href,
        caption = caption
    )
}

fn neighborhood_page(cells: &[String]) -> String {
    format!(
        "<html><body><table><tr>{}</tr></table></body></html>",
        cells.concat()
    )
}

fn numbered_images(prefix: &str, count: usize) -> String {
    let cells: Vec<String> = (1..=count)
        .map(|n| {
            image_cell(
                &format!("/RES/access/sp/{}-{:02}.jpg", prefix, n),
                &format!("{} view {}", prefix, n),
            )
        })
        .collect();
    neighborhood_page(&cells)
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Area A with two neighborhoods of 3 and 2 images
async fn mount_area_a(server: &MockServer) {
    mount_html(
        server,
        "/area/a",
        area_page(&[
            ("/RES/A001.html", "W. Franklin St. and Monument Ave. (A001)"),
            ("/RES/A002.html", "Oregon Hill (A002)"),
        ]),
    )
    .await;
    mount_html(server, "/RES/A001.html", numbered_images("A001", 3)).await;
    mount_html(server, "/RES/A002.html", numbered_images("A002", 2)).await;
}

fn image_count(db_path: &Path) -> u64 {
    let storage = SqliteStorage::new(db_path).unwrap();
    storage.count_images().unwrap()
}

#[tokio::test]
async fn test_rerun_creates_nothing_new() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let first = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        RunOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(first.images_created, 5);
    assert_eq!(first.collections_created, 2);
    assert_eq!(image_count(&db_path), 5);

    let second = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        RunOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(second.images_created, 0);
    assert_eq!(second.images_duplicate, 5);
    assert_eq!(second.collections_created, 0);
    assert_eq!(image_count(&db_path), 5);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_sources().unwrap(), 1);
    assert_eq!(storage.count_collections().unwrap(), 2);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        options,
    )
    .await
    .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.images_would_create, 5);
    assert_eq!(summary.images_created, 0);
    assert_eq!(summary.collections_created, 2);
    assert!(!db_path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_dry_run_leaves_existing_catalog_unchanged() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    {
        // An empty catalog in rollback-journal mode
        SqliteStorage::new(&db_path).unwrap();
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA journal_mode = DELETE;").unwrap();
    }
    let before = std::fs::read(&db_path).unwrap();

    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        options,
    )
    .await
    .unwrap();

    assert_eq!(summary.images_would_create, 5);
    assert_eq!(std::fs::read(&db_path).unwrap(), before);
    assert_eq!(image_count(&db_path), 0);
}

#[tokio::test]
async fn test_dry_run_after_import_sees_duplicates() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        RunOptions::default(),
    )
    .await
    .unwrap();

    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        options,
    )
    .await
    .unwrap();

    assert_eq!(summary.images_would_create, 0);
    assert_eq!(summary.images_duplicate, 5);
    assert_eq!(summary.collections_created, 0);
    assert_eq!(image_count(&db_path), 5);
}

#[tokio::test]
async fn test_max_neighborhoods_stops_fetching() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/area/b",
        area_page(&[
            ("/RES/B001.html", "Church Hill (B001)"),
            ("/RES/B002.html", "Union Hill (B002)"),
            ("/RES/B003.html", "Fulton (B003)"),
        ]),
    )
    .await;
    mount_html(&server, "/RES/B001.html", numbered_images("B001", 2)).await;
    for route in ["/RES/B002.html", "/RES/B003.html"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(numbered_images("X", 1)))
            .expect(0)
            .mount(&server)
            .await;
    }
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let options = RunOptions {
        max_neighborhoods: Some(1),
        ..RunOptions::default()
    };
    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::B),
        options,
    )
    .await
    .unwrap();

    assert_eq!(summary.neighborhoods_processed, 1);
    assert_eq!(summary.neighborhoods_limited, 2);
    assert_eq!(summary.images_created, 2);
    assert_eq!(image_count(&db_path), 2);
}

#[tokio::test]
async fn test_max_images_per_neighborhood() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let options = RunOptions {
        max_images: Some(1),
        ..RunOptions::default()
    };
    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::A),
        options,
    )
    .await
    .unwrap();

    assert_eq!(summary.neighborhoods_processed, 2);
    assert_eq!(summary.images_created, 2);
    assert_eq!(image_count(&db_path), 2);
}

#[tokio::test]
async fn test_malformed_entry_is_skipped() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/area/c",
        area_page(&[("/RES/C001.html", "The Fan (C001)")]),
    )
    .await;
    let cells = vec![
        image_cell("/RES/access/sp/C001-01.jpg", "Park Ave.<br>1965"),
        image_cell("/RES/access/sp/", "Untitled"),
        image_cell("/RES/access/up/C001-03.jpg", "\"Grove Ave.\">"),
    ];
    mount_html(&server, "/RES/C001.html", neighborhood_page(&cells)).await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::Single(Area::C),
        RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.images_created, 2);
    assert_eq!(summary.images_malformed, 1);
    assert_eq!(image_count(&db_path), 2);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let source = storage.find_source("Library of Virginia").unwrap().unwrap();
    let permalink = format!("{}/RES/access/up/C001-03.jpg", server.uri());
    let image = storage
        .get_image_by_permalink(source.id, &permalink)
        .unwrap()
        .expect("image should be stored");
    assert_eq!(image.title, "Grove Ave.");
    assert_eq!(image.year, Some(1965));
    assert_eq!(
        image.record_url.as_deref(),
        Some(format!("{}/cgi-bin/record?id=1", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_all_visits_each_area_once_in_order() {
    let server = MockServer::start().await;
    for area in Area::ALL {
        let code = area.as_str();
        Mock::given(method("GET"))
            .and(path(format!("/area/{}", code.to_lowercase())))
            .respond_with(ResponseTemplate::new(200).set_body_string(area_page(&[(
                format!("/RES/{}001.html", code).as_str(),
                format!("Neighborhood ({}001)", code).as_str(),
            )])))
            .expect(1)
            .mount(&server)
            .await;
        mount_html(
            &server,
            &format!("/RES/{}001.html", code),
            numbered_images(&format!("{}001", code), 1),
        )
        .await;
    }
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::All,
        RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.areas_visited, Area::ALL.to_vec());
    assert_eq!(summary.areas_processed, 4);
    assert_eq!(summary.images_created, 4);

    let area_paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p.starts_with("/area/"))
        .collect();
    assert_eq!(area_paths, vec!["/area/a", "/area/b", "/area/c", "/area/d"]);
}

#[tokio::test]
async fn test_unreachable_area_is_skipped() {
    let server = MockServer::start().await;
    mount_area_a(&server).await;
    Mock::given(method("GET"))
        .and(path("/area/b"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    for code in ["c", "d"] {
        mount_html(&server, &format!("/area/{}", code), area_page(&[])).await;
    }
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let summary = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::All,
        RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.areas_processed, 3);
    assert_eq!(summary.areas_skipped, 1);
    assert_eq!(summary.images_created, 5);
}

#[tokio::test]
async fn test_no_reachable_area_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let err = run_import(
        create_test_config(&server, &db_path),
        AreaSelector::All,
        RunOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ImportError::NoAreasReachable { attempted: 4 }));
}
