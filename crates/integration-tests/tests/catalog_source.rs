//! Integration tests for the catalog source manager against a live stub
//! feed: scanned-URL updates, all-or-nothing refresh, and the
//! URL-kept/catalog-kept asymmetry on fetch failure.

use std::time::Duration;

use axum::http::StatusCode;
use kasse_client::{
    CatalogError, CatalogManager, HttpProductFeed, KeyValueStore, MemoryStore, PRODUCT_URL_KEY,
};
use kasse_core::{Money, ProductId};
use kasse_integration_tests::StubFeed;

fn manager_on(store: MemoryStore) -> CatalogManager<MemoryStore, HttpProductFeed> {
    let feed = HttpProductFeed::new(Duration::from_secs(5)).expect("build feed client");
    CatalogManager::open(store, feed).expect("open manager")
}

#[tokio::test]
async fn test_scanned_url_loads_catalog_end_to_end() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let manager = manager_on(MemoryStore::new());

    let catalog = manager.apply_scanned_url(&feed.url()).await.expect("scan");

    assert_eq!(catalog.len(), 2);
    let coffee = catalog.get(&ProductId::new("p1")).expect("coffee");
    assert_eq!(coffee.name, "Coffee");
    assert_eq!(coffee.price, Money::from_minor_units(350));
    assert!(manager.last_fetched_at().is_some());

    // The URL survived into the settings store
    let manager2 = manager_on(MemoryStore::with_entry(PRODUCT_URL_KEY, &feed.url()));
    assert_eq!(manager2.source_url().expect("url").as_str(), feed.url());
}

#[tokio::test]
async fn test_refresh_picks_up_feed_changes() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let manager = manager_on(MemoryStore::new());
    manager.apply_scanned_url(&feed.url()).await.expect("scan");

    feed.set_products(r#"[{"id": "p3", "name": "Tea", "price": 2.80}]"#);
    let catalog = manager.refresh().await.expect("refresh");

    assert_eq!(catalog.len(), 1);
    assert!(catalog.contains(&ProductId::new("p3")));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_catalog() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let manager = manager_on(MemoryStore::new());
    manager.apply_scanned_url(&feed.url()).await.expect("scan");
    let fetched_at = manager.last_fetched_at();

    feed.respond_with(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let err = manager.refresh().await.expect_err("refresh must fail");

    assert!(matches!(err, CatalogError::Fetch(_)));
    assert_eq!(manager.catalog().len(), 2);
    assert_eq!(manager.last_fetched_at(), fetched_at);
}

#[tokio::test]
async fn test_malformed_feed_is_a_fetch_error() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let manager = manager_on(MemoryStore::new());
    manager.apply_scanned_url(&feed.url()).await.expect("scan");

    // Missing `name`, so the payload does not match the feed schema
    feed.set_products(r#"[{"id": "p9", "price": 1.00}]"#);
    let err = manager.refresh().await.expect_err("refresh must fail");

    assert!(matches!(err, CatalogError::Fetch(_)));
    assert_eq!(manager.catalog().len(), 2);
}

#[tokio::test]
async fn test_scan_failure_keeps_new_url_but_old_catalog() {
    let good = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let bad = StubFeed::spawn("").await;
    bad.respond_with(StatusCode::NOT_FOUND, "no such feed");

    let manager = manager_on(MemoryStore::new());
    manager.apply_scanned_url(&good.url()).await.expect("scan");

    let err = manager
        .apply_scanned_url(&bad.url())
        .await
        .expect_err("scan must fail");
    assert!(matches!(err, CatalogError::Fetch(_)));

    // URL is configuration: kept for retry. Catalog is data: unchanged.
    assert_eq!(manager.source_url().expect("url").as_str(), bad.url());
    assert_eq!(manager.catalog().len(), 2);
}

#[tokio::test]
async fn test_non_url_payload_changes_nothing() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let store = MemoryStore::with_entry(PRODUCT_URL_KEY, &feed.url());
    let manager = manager_on(store);

    let err = manager
        .apply_scanned_url("not a url")
        .await
        .expect_err("payload must be rejected");
    assert!(matches!(err, CatalogError::InvalidUrl { .. }));

    assert_eq!(manager.source_url().expect("url").as_str(), feed.url());
}

#[tokio::test]
async fn test_unreachable_feed_is_a_transport_error() {
    let manager = manager_on(MemoryStore::new());
    // Nothing listens here; connection is refused
    let err = manager
        .apply_scanned_url("http://127.0.0.1:9/products.json")
        .await
        .expect_err("fetch must fail");
    assert!(matches!(err, CatalogError::Fetch(_)));
    assert!(manager.catalog().is_empty());
}

#[tokio::test]
async fn test_persisted_url_survives_reopen_catalog_does_not() {
    let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
    let store = MemoryStore::new();
    store.set(PRODUCT_URL_KEY, &feed.url()).expect("persist url");

    // A fresh manager finds the URL but no catalog; it is re-fetched on
    // demand rather than persisted
    let manager = manager_on(store);
    assert!(manager.is_configured());
    assert!(manager.catalog().is_empty());
    let catalog = manager.refresh().await.expect("refresh");
    assert_eq!(catalog.len(), 2);
}
