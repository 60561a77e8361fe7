//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle over the real reqwest transport.

use catalog_crawler::config::{load_config, load_seed_file, Config, OutputFormat};
use catalog_crawler::crawler::{crawl, HttpTransport, Transport};
use catalog_crawler::output::{write_catalog, Catalog};
use catalog_crawler::product::GenderSummary;
use catalog_crawler::{ConfigError, Gender, TransportError};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for the mock site
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::for_site(base_url);
    config.crawler.seed_from_menu = false;
    config.http.delay_ms = 0;
    config.http.timeout_secs = 5;
    config.http.max_attempts = 3;
    config.http.backoff_initial_ms = 10;
    config.http.backoff_max_ms = 40;
    config
}

fn listing_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head>
        <body><h1>{title}</h1><ul>{anchors}</ul></body></html>"#
    )
}

fn home_page() -> String {
    listing_page("Men & Women Jackets", &["/men-jackets"]).replace(
        "<body>",
        r#"<body><nav><a href="/men-jackets">Men Jackets</a></nav>"#,
    )
}

fn product_page(name: &str, price: f64) -> String {
    format!(
        r#"<html><head><title>{name} | Isee</title>
        <script type="application/ld+json">
        {{"@context":"https://schema.org","@type":"Product","name":"{name}",
          "sku":"RJ-1","image":["/img/red-1.jpg","/img/red-1.jpg","/img/red-2.jpg"],
          "offers":{{"@type":"Offer","price":"{price}","priceCurrency":"EUR"}}}}
        </script></head>
        <body><h1>{name}</h1></body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Home → /men-jackets → /isee-red-jacket
async fn mount_shop(server: &MockServer) {
    mount_page(server, "/", home_page()).await;

    Mock::given(method("GET"))
        .and(path("/men-jackets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("Men's Jackets", &["/isee-red-jacket", "/"])),
        )
        .expect(1)
        .mount(server)
        .await;

    mount_page(server, "/isee-red-jacket", product_page("Red Jacket", 89.0)).await;
}

#[tokio::test]
async fn test_full_crawl_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_shop(&mock_server).await;

    let config = create_test_config(&base_url);
    let outcome = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(outcome.menu.len(), 1);
    assert_eq!(outcome.menu[0].text, "Men Jackets");
    assert_eq!(outcome.menu[0].url, format!("{}/men-jackets", base_url));

    assert_eq!(outcome.products.len(), 1);
    let product = &outcome.products[0];
    assert_eq!(product.name, "Red Jacket");
    assert_eq!(product.price, Some(89.0));
    assert_eq!(product.currency, "EUR");
    assert_eq!(product.sku, "RJ-1");
    assert_eq!(product.gender, GenderSummary::Men);
    assert_eq!(product.categories, vec!["jackets".to_string()]);
    assert_eq!(
        product.images,
        vec![
            format!("{}/img/red-1.jpg", base_url),
            format!("{}/img/red-2.jpg", base_url),
        ]
    );
    assert_eq!(product.found_in.len(), 1);
    assert_eq!(product.found_in[0].gender, Some(Gender::Men));
    assert_eq!(product.found_in[0].category.as_deref(), Some("jackets"));
    assert_eq!(
        product.found_in[0].source_url,
        format!("{}/men-jackets", base_url)
    );

    let stats = &outcome.statistics;
    assert_eq!(stats.listing_pages, 2);
    assert_eq!(stats.candidates_pruned, 1);
    assert_eq!(stats.products, 1);
    assert!(stats.finished_at.is_some());
    assert!(!stats.stopped_early);

    let requests = mock_server.received_requests().await.unwrap();
    for page in ["/", "/isee-red-jacket"] {
        let count = requests.iter().filter(|r| r.url.path() == page).count();
        assert_eq!(count, 1, "{} requested {} times", page, count);
    }
}

#[tokio::test]
async fn test_catalog_written_as_json() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_shop(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_path = temp_dir.path().join("data/products.json");

    let config = create_test_config(&base_url);
    let outcome = crawl(&config).await.expect("Crawl should succeed");
    let catalog = Catalog::new(outcome.menu, outcome.products);
    write_catalog(&catalog, OutputFormat::Json, &out_path).expect("Failed to write JSON");

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["menu"][0]["text"], "Men Jackets");
    let product = &written["products"][0];
    assert_eq!(product["name"], "Red Jacket");
    assert_eq!(product["gender"], "men");
    assert_eq!(product["categories"], serde_json::json!(["jackets"]));
    assert_eq!(product["found_in"][0]["category"], "jackets");
}

#[tokio::test]
async fn test_catalog_written_as_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_shop(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_path = temp_dir.path().join("products.csv");

    let config = create_test_config(&base_url);
    let outcome = crawl(&config).await.expect("Crawl should succeed");
    let catalog = Catalog::new(outcome.menu, outcome.products);
    write_catalog(&catalog, OutputFormat::Csv, &out_path).expect("Failed to write CSV");

    let mut reader = csv::Reader::from_path(&out_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let kinds: Vec<&str> = rows.iter().map(|row| &row[0]).collect();
    assert_eq!(kinds, vec!["menu", "product"]);
    assert_eq!(&rows[1][5], "Red Jacket");
    assert_eq!(&rows[1][12], "men");
    assert_eq!(&rows[1][13], r#"["jackets"]"#);
}

#[tokio::test]
async fn test_transient_status_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let transport = HttpTransport::new(&config.http).unwrap();
    let page = transport
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await
        .expect("Second attempt should succeed");

    assert_eq!(page.final_url, format!("{}/flaky", mock_server.uri()));
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let transport = HttpTransport::new(&config.http).unwrap();
    let err = transport
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_failing_page_does_not_abort_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        listing_page("Men & Women Hoodies", &["/men", "/women"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/men"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/women",
        listing_page("Women Hoodies", &["/isee-grey-hoodie"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/isee-grey-hoodie",
        product_page("Grey Hoodie", 59.0),
    )
    .await;

    let config = create_test_config(&base_url);
    let outcome = crawl(&config).await.expect("Crawl should survive a 500");

    assert_eq!(outcome.statistics.pages_failed, 1);
    assert_eq!(outcome.products.len(), 1);
    assert_eq!(outcome.products[0].name, "Grey Hoodie");
    assert_eq!(outcome.products[0].gender, GenderSummary::Women);
}

#[tokio::test]
async fn test_page_budget_limits_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", listing_page("Men Jackets", &["/men/1"])).await;
    for n in 1..=30 {
        let next = format!("/men/{}", n + 1);
        let after = format!("/men/{}", n + 2);
        mount_page(
            &mock_server,
            &format!("/men/{}", n),
            listing_page("Men Jackets", &[next.as_str(), after.as_str()]),
        )
        .await;
    }

    let mut config = create_test_config(&base_url);
    config.crawler.page_budget = 5;
    let outcome = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(outcome.statistics.pages_attempted(), 5);

    let requests = mock_server.received_requests().await.unwrap();
    let listing_requests = requests
        .iter()
        .filter(|r| r.url.path().starts_with("/men/"))
        .count();
    assert_eq!(listing_requests, 4);
}

#[tokio::test]
async fn test_sitemap_supplements_single_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "<html><title>Isee</title></html>".to_string()).await;
    mount_page(
        &mock_server,
        "/sitemap.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{base_url}/collections/women-hoodies</loc></url>
              <url><loc>{base_url}/pages/about</loc></url>
            </urlset>"#
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/collections/women-hoodies",
        listing_page("Women Hoodies", &["/isee-grey-hoodie"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/isee-grey-hoodie",
        product_page("Grey Hoodie", 59.0),
    )
    .await;

    let config = create_test_config(&base_url);
    let outcome = crawl(&config).await.expect("Crawl should succeed");

    assert_eq!(outcome.products.len(), 1);
    assert_eq!(outcome.products[0].categories, vec!["hoodies".to_string()]);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/pages/about"));
}

#[tokio::test]
async fn test_robots_txt_respected_when_enabled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_shop(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /isee-"),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.respect_robots = true;
    let outcome = crawl(&config).await.expect("Crawl should succeed");

    assert!(outcome.products.is_empty());
    assert!(outcome.statistics.pages_disallowed >= 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/isee-red-jacket"));
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_shop(&mock_server).await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
base-url = "{base_url}"
page-budget = 20
seed-from-menu = false

[http]
delay-ms = 0
backoff-initial-ms = 10
backoff-max-ms = 40

[output]
format = "csv"
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.output.format, OutputFormat::Csv);
    assert_eq!(config.output_path(), "data/products.csv");

    let outcome = crawl(&config).await.expect("Crawl should succeed");
    assert_eq!(outcome.products.len(), 1);
}

#[test]
fn test_missing_seed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("seeds.txt");

    let err = load_seed_file(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSeedFile { .. }));
}
