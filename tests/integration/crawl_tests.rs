//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and run the full crawl
//! cycle end-to-end through the HTTP navigator.

use ephys_scraper::config::{Config, NavigationConfig, OutputConfig, SiteConfig};
use ephys_scraper::crawler::{Coordinator, HttpNavigator};
use ephys_scraper::output::{Manifest, CONTENT_FILE_NAME, MANIFEST_FILE_NAME};
use ephys_scraper::ScrapeError;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration targeting the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    let domain = base_url
        .strip_prefix("http://")
        .expect("mock server uses http")
        .to_string();

    Config {
        site: SiteConfig {
            root_url: format!("{}/", base_url),
            domain,
            main_content_selector: "[id=mainContent]".to_string(),
        },
        output: OutputConfig {
            directory: output_dir.display().to_string(),
        },
        navigation: NavigationConfig {
            user_agent: "ephys-scraper-test".to_string(),
            timeout_secs: 5,
            ..NavigationConfig::default()
        },
    }
}

fn coordinator(config: Config, output_root: PathBuf) -> Coordinator<HttpNavigator> {
    ephys_scraper::config::validate(&config).expect("test config is valid");
    let navigator =
        HttpNavigator::from_config(&config.navigation).expect("Failed to build navigator");
    Coordinator::with_output_root(config, navigator, output_root)
}

async fn mount_html(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, mime: &str, len: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x42u8; len], mime))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body>
        <nav><a href="/">Home</a></nav>
        <div id="mainContent"><h1>Welcome</h1><p>See the <a href="/docs">docs</a>.</p>
        <ul><li>one</li><li>two</li></ul>
        <img src="/media/photo.jpg"><img src="/media/pixel.gif"></div>
        <a href="https://external.com/b">elsewhere</a>
        <a href="/docs?x=1">tracking</a>
        <a href="/manual.pdf">manual</a>
        <a>no target</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_html(
        &mock_server,
        "/docs",
        r#"<html><body><div id="mainContent"><p>Docs</p>
        <img src="/media/photo.jpg"><img src="/media/diagram.png"></div>
        <a href="/docs/start">start</a><a href="https://external.com/b">elsewhere</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_html(
        &mock_server,
        "/docs/start",
        r#"<html><body><div id="mainContent">Start here</div><a href="/">home</a></body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_image(&mock_server, "/media/photo.jpg", "image/jpeg", 5000).await;
    mount_image(&mock_server, "/media/pixel.gif", "image/gif", 43).await;
    mount_image(&mock_server, "/media/diagram.png", "image/png", 2500).await;

    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("1700000000000");
    let config = create_test_config(&base_url, dir.path());

    let outcome = coordinator(config, output_root.clone())
        .run()
        .await
        .expect("Crawl should succeed");

    // Pages in depth-first order
    assert_eq!(
        outcome.state.visited(),
        &[
            format!("{}/", base_url),
            format!("{}/docs", base_url),
            format!("{}/docs/start", base_url),
        ]
    );

    // Each skipped link recorded once, in discovery order
    assert_eq!(
        outcome.state.skipped(),
        &[
            "https://external.com/b".to_string(),
            format!("{}/docs?x=1", base_url),
            format!("{}/manual.pdf", base_url),
        ]
    );

    // Page artifacts mirror the site layout
    let home = std::fs::read_to_string(output_root.join(CONTENT_FILE_NAME)).unwrap();
    assert!(home.contains("Welcome"));
    assert!(home.contains("[docs](/docs)"));
    assert!(home.contains("- one"));
    assert!(home.contains("- two"));
    assert!(!home.contains("<p>"));
    assert!(output_root.join("docs").join(CONTENT_FILE_NAME).is_file());
    assert!(output_root
        .join("docs")
        .join("start")
        .join(CONTENT_FILE_NAME)
        .is_file());

    // Images next to the page that loaded them, small ones discarded
    assert_eq!(
        std::fs::read(output_root.join("photo_jpg.jpg")).unwrap().len(),
        5000
    );
    assert!(!output_root.join("pixel_gif.gif").exists());
    assert!(output_root.join("docs").join("photo_jpg.jpg").is_file());
    assert!(output_root.join("docs").join("diagram_png.png").is_file());

    // Manifest on disk matches the final state
    let manifest: Manifest =
        serde_json::from_slice(&std::fs::read(output_root.join(MANIFEST_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(manifest.visited.len(), 3);
    assert_eq!(manifest.skipped.len(), 3);
    let photo = manifest
        .images
        .iter()
        .find(|image| image.file_name == "photo_jpg.jpg")
        .expect("photo recorded");
    assert_eq!(photo.number, 2);
    assert_eq!(manifest.images.len(), 2);

    assert_eq!(outcome.statistics.pages_visited, 3);
    assert_eq!(outcome.statistics.image_writes, 3);
}

#[tokio::test]
async fn test_missing_main_content_aborts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><div id="mainContent">Home</div>
        <a href="/broken">broken</a><a href="/after">after</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_html(
        &mock_server,
        "/broken",
        r#"<html><body><div id="other">No main region</div></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_html(
        &mock_server,
        "/after",
        r#"<html><body><div id="mainContent">After</div></body></html>"#.to_string(),
        0,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("1700000000000");
    let config = create_test_config(&base_url, dir.path());

    let result = coordinator(config, output_root.clone()).run().await;

    match result {
        Err(ScrapeError::Extraction { url, .. }) => {
            assert_eq!(url, format!("{}/broken", base_url));
        }
        other => panic!("expected extraction error, got {:?}", other.map(|_| ())),
    }

    // Earlier output stays, no manifest
    assert!(output_root.join(CONTENT_FILE_NAME).is_file());
    assert!(!output_root.join(MANIFEST_FILE_NAME).exists());
}

#[tokio::test]
async fn test_error_status_page_is_still_processed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><div id="mainContent">Home</div><a href="/gone">gone</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<html><body><div id="mainContent">Page not found</div></body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("1700000000000");
    let config = create_test_config(&base_url, dir.path());

    let outcome = coordinator(config, output_root.clone())
        .run()
        .await
        .expect("Crawl should succeed");

    assert_eq!(outcome.state.visited().len(), 2);
    let gone = std::fs::read_to_string(output_root.join("gone").join(CONTENT_FILE_NAME)).unwrap();
    assert!(gone.contains("Page not found"));
}

#[tokio::test]
async fn test_unreachable_root_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("1700000000000");
    let config = create_test_config("http://127.0.0.1:1", dir.path());

    let result = coordinator(config, output_root.clone()).run().await;

    assert!(matches!(result, Err(ScrapeError::Navigation { .. })));
    assert!(!output_root.join(MANIFEST_FILE_NAME).exists());
}

#[tokio::test]
async fn test_output_root_named_by_start_time() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><div id="mainContent">Only page</div></body></html>"#.to_string(),
        1,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, dir.path());

    let outcome = ephys_scraper::crawler::crawl(config)
        .await
        .expect("Crawl should succeed");

    let run_dir = outcome
        .manifest_path
        .parent()
        .expect("manifest has a parent")
        .to_path_buf();
    assert_eq!(run_dir.parent(), Some(dir.path()));

    let name = run_dir.file_name().unwrap().to_str().unwrap();
    let millis: i64 = name.parse().expect("run directory is epoch millis");
    assert!(millis > 1_600_000_000_000);
    assert!(run_dir.join(CONTENT_FILE_NAME).is_file());
}

#[tokio::test]
async fn test_responsive_image_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><div id="mainContent">Gallery
        <img srcset="/media/a.jpg 1x">
        <div style="background-image: url(/media/banner.png)"></div></div></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_image(&mock_server, "/media/a.jpg", "image/jpeg", 4000).await;
    mount_image(&mock_server, "/media/banner.png", "image/png", 6000).await;

    let dir = tempfile::tempdir().unwrap();
    let output_root = dir.path().join("1700000000000");
    let config = create_test_config(&base_url, dir.path());

    let outcome = coordinator(config, output_root.clone())
        .run()
        .await
        .expect("Crawl should succeed");

    assert_eq!(
        std::fs::read(output_root.join("a_jpg.jpg")).unwrap().len(),
        4000
    );
    assert!(output_root.join("banner_png.png").is_file());
    assert_eq!(outcome.state.image_count("a_jpg.jpg"), 1);
}
