//! The catalog source manager.
//!
//! Owns the active product catalog and the feed URL it is fetched from.
//! The two have different lifecycles by design: the URL is configuration
//! and survives failed fetches, while the catalog is data and only changes
//! by an all-or-nothing swap after a successful fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use kasse_core::Catalog;
use parking_lot::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::CatalogError;
use crate::feed::ProductFeed;
use crate::store::{KeyValueStore, PRODUCT_URL_KEY};

/// Manager for the active catalog source.
///
/// Cheaply cloneable via `Arc`; all clones share the same source state.
/// Readers take [`CatalogManager::catalog`] snapshots (`Arc<Catalog>`) and
/// observe either the fully-old or fully-new product set, never a partial
/// one. An in-flight fetch holds the shared state alive, so a result that
/// arrives after every external handle is gone is simply dropped with it.
pub struct CatalogManager<S, F> {
    inner: Arc<ManagerInner<S, F>>,
}

impl<S, F> Clone for CatalogManager<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ManagerInner<S, F> {
    store: S,
    feed: F,
    state: RwLock<SourceState>,
    refreshing: AtomicBool,
}

struct SourceState {
    url: Option<Url>,
    catalog: Arc<Catalog>,
    last_fetched_at: Option<DateTime<Utc>>,
}

/// Clears the in-flight flag when a refresh completes, errors included.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<S, F> CatalogManager<S, F>
where
    S: KeyValueStore,
    F: ProductFeed,
{
    /// Open the manager, loading the persisted feed URL if one exists.
    ///
    /// The catalog starts empty and is populated by the first successful
    /// [`refresh`](Self::refresh). A persisted URL that no longer parses is
    /// logged and treated as unconfigured rather than wedging startup.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] if the settings store cannot be read.
    pub fn open(store: S, feed: F) -> Result<Self, CatalogError> {
        let url = match store.get(PRODUCT_URL_KEY)? {
            None => None,
            Some(raw) => match Url::parse(&raw) {
                Ok(parsed) => Some(parsed),
                Err(error) => {
                    warn!(%error, url = %raw, "ignoring unparseable persisted product URL");
                    None
                }
            },
        };

        Ok(Self {
            inner: Arc::new(ManagerInner {
                store,
                feed,
                state: RwLock::new(SourceState {
                    url,
                    catalog: Arc::new(Catalog::default()),
                    last_fetched_at: None,
                }),
                refreshing: AtomicBool::new(false),
            }),
        })
    }

    /// Record a new feed URL without fetching.
    ///
    /// Validates, persists under `"productUrl"`, and updates the in-memory
    /// source. The active catalog is untouched until the next
    /// [`refresh`](Self::refresh).
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidUrl`] if `url` is empty or not an http(s)
    /// URL (nothing is persisted), [`CatalogError::Store`] if persisting
    /// fails.
    pub fn set_source_url(&self, url: &str) -> Result<(), CatalogError> {
        let parsed = validate_url(url)?;
        self.inner.store.set(PRODUCT_URL_KEY, parsed.as_str())?;
        self.inner.state.write().url = Some(parsed);
        info!(url = %url.trim(), "product feed URL updated");
        Ok(())
    }

    /// Seed the source URL if none is configured yet.
    ///
    /// Used at startup to apply a config-supplied default without
    /// overriding what a user configured in an earlier run. Returns whether
    /// the seed was applied.
    ///
    /// # Errors
    ///
    /// Same contract as [`set_source_url`](Self::set_source_url).
    pub fn seed_source_url(&self, url: &str) -> Result<bool, CatalogError> {
        if self.is_configured() {
            return Ok(false);
        }
        self.set_source_url(url)?;
        Ok(true)
    }

    /// Fetch the product list from the configured URL and swap it in.
    ///
    /// All-or-nothing: on any failure the previously active catalog and its
    /// fetch timestamp are left untouched, so a failed refresh can never
    /// empty a catalog that was already loaded. Concurrent calls are
    /// serialized by rejection - the returned snapshot always corresponds
    /// to the most recently started successful refresh.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidUrl`] if no URL is configured,
    /// [`CatalogError::RefreshInProgress`] if another refresh is
    /// outstanding, [`CatalogError::Fetch`] if the fetch or decode fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Catalog>, CatalogError> {
        let url = self
            .inner
            .state
            .read()
            .url
            .clone()
            .ok_or_else(|| CatalogError::InvalidUrl {
                url: String::new(),
                reason: "no product feed URL configured".to_owned(),
            })?;

        let _guard = RefreshGuard::acquire(&self.inner.refreshing)
            .ok_or(CatalogError::RefreshInProgress)?;

        // The fetch is the only suspension point and runs outside the state
        // lock; an error here propagates before any state is touched.
        let products = self.inner.feed.fetch_products(&url).await?;
        let catalog = Arc::new(Catalog::new(products));

        let mut state = self.inner.state.write();
        state.catalog = Arc::clone(&catalog);
        state.last_fetched_at = Some(Utc::now());
        drop(state);

        info!(products = catalog.len(), "catalog refreshed");
        Ok(catalog)
    }

    /// Apply a scanned QR payload: decode as a URL, record it, refresh.
    ///
    /// If the refresh fails the URL change is kept so the user can retry,
    /// but the catalog remains the previous one - the URL is
    /// configuration, the catalog is data, and only data changes are
    /// transactional against fetch success.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidUrl`] if the payload is not a URL (nothing
    /// changes), otherwise any [`refresh`](Self::refresh) error.
    #[instrument(skip(self, data))]
    pub async fn apply_scanned_url(&self, data: &str) -> Result<Arc<Catalog>, CatalogError> {
        self.set_source_url(data)?;
        self.refresh().await
    }

    /// Snapshot of the active catalog.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.state.read().catalog)
    }

    /// The currently configured feed URL, if any.
    #[must_use]
    pub fn source_url(&self) -> Option<Url> {
        self.inner.state.read().url.clone()
    }

    /// When the active catalog was fetched, if ever.
    #[must_use]
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.read().last_fetched_at
    }

    /// Whether a feed URL is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.state.read().url.is_some()
    }
}

/// Validate a candidate feed URL: non-empty, parseable, http(s).
fn validate_url(raw: &str) -> Result<Url, CatalogError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidUrl {
            url: raw.to_owned(),
            reason: "URL is empty".to_owned(),
        });
    }
    let parsed = Url::parse(trimmed).map_err(|error| CatalogError::InvalidUrl {
        url: raw.to_owned(),
        reason: error.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CatalogError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;

    use kasse_core::{Money, Product, ProductId};
    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::error::FetchError;
    use crate::store::MemoryStore;

    const FEED_URL: &str = "https://example.com/products.json";

    fn products() -> Vec<Product> {
        vec![
            Product {
                id: ProductId::new("p1"),
                name: "Coffee".to_owned(),
                price: Money::from_minor_units(350),
            },
            Product {
                id: ProductId::new("p2"),
                name: "Cake".to_owned(),
                price: Money::from_minor_units(400),
            },
        ]
    }

    /// Feed that replays a scripted sequence of responses.
    struct SequenceFeed {
        responses: Mutex<VecDeque<Result<Vec<Product>, FetchError>>>,
    }

    impl SequenceFeed {
        fn new(responses: Vec<Result<Vec<Product>, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }
    }

    impl ProductFeed for SequenceFeed {
        async fn fetch_products(&self, _url: &Url) -> Result<Vec<Product>, FetchError> {
            self.responses
                .lock()
                .pop_front()
                .expect("feed called more often than scripted")
        }
    }

    /// Feed that signals when a fetch starts and waits to be released.
    struct GatedFeed {
        started: Arc<Semaphore>,
        release: Arc<Semaphore>,
    }

    impl ProductFeed for GatedFeed {
        async fn fetch_products(&self, _url: &Url) -> Result<Vec<Product>, FetchError> {
            self.started.add_permits(1);
            self.release.acquire().await.expect("release gate closed").forget();
            Ok(products())
        }
    }

    fn manager_with(
        store: MemoryStore,
        responses: Vec<Result<Vec<Product>, FetchError>>,
    ) -> CatalogManager<MemoryStore, SequenceFeed> {
        CatalogManager::open(store, SequenceFeed::new(responses)).expect("open")
    }

    fn server_error() -> FetchError {
        FetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[test]
    fn test_open_loads_persisted_url() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![]);
        assert_eq!(manager.source_url().unwrap().as_str(), FEED_URL);
        assert!(manager.catalog().is_empty());
        assert_eq!(manager.last_fetched_at(), None);
    }

    #[test]
    fn test_open_ignores_unparseable_persisted_url() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, "not a url");
        let manager = manager_with(store, vec![]);
        assert!(!manager.is_configured());
    }

    #[test]
    fn test_set_source_url_persists() {
        let manager = manager_with(MemoryStore::new(), vec![]);
        manager.set_source_url(FEED_URL).unwrap();

        assert_eq!(manager.source_url().unwrap().as_str(), FEED_URL);
        assert_eq!(
            manager.inner.store.get(PRODUCT_URL_KEY).unwrap().as_deref(),
            Some(FEED_URL)
        );
    }

    #[test]
    fn test_set_source_url_rejects_invalid() {
        let manager = manager_with(MemoryStore::new(), vec![]);

        for candidate in ["", "   ", "not a url", "ftp://example.com/feed"] {
            assert!(matches!(
                manager.set_source_url(candidate),
                Err(CatalogError::InvalidUrl { .. })
            ));
        }
        assert!(!manager.is_configured());
        assert_eq!(manager.inner.store.get(PRODUCT_URL_KEY).unwrap(), None);
    }

    #[test]
    fn test_seed_source_url_only_when_unconfigured() {
        let manager = manager_with(MemoryStore::new(), vec![]);
        assert!(manager.seed_source_url(FEED_URL).unwrap());
        assert!(!manager.seed_source_url("https://other.example/feed").unwrap());
        assert_eq!(manager.source_url().unwrap().as_str(), FEED_URL);
    }

    #[tokio::test]
    async fn test_refresh_without_url_fails() {
        let manager = manager_with(MemoryStore::new(), vec![]);
        assert!(matches!(
            manager.refresh().await,
            Err(CatalogError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_swaps_catalog_and_stamps_time() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![Ok(products())]);

        let catalog = manager.refresh().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&ProductId::new("p1")));
        assert!(manager.last_fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_catalog_untouched() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![Ok(products()), Err(server_error())]);

        manager.refresh().await.unwrap();
        let catalog_before = manager.catalog();
        let fetched_before = manager.last_fetched_at();

        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));
        assert!(Arc::ptr_eq(&manager.catalog(), &catalog_before));
        assert_eq!(manager.last_fetched_at(), fetched_before);
    }

    #[tokio::test]
    async fn test_failed_refresh_releases_the_guard() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![Err(server_error()), Ok(products())]);

        assert!(manager.refresh().await.is_err());
        // A later refresh must not see a stale in-progress flag
        assert!(manager.refresh().await.is_ok());
    }

    #[tokio::test]
    async fn test_apply_scanned_url_fetches_new_catalog() {
        let manager = manager_with(MemoryStore::new(), vec![Ok(products())]);

        let catalog = manager.apply_scanned_url(FEED_URL).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(manager.source_url().unwrap().as_str(), FEED_URL);
    }

    #[tokio::test]
    async fn test_apply_scanned_url_keeps_url_on_fetch_failure() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![Ok(products()), Err(server_error())]);
        manager.refresh().await.unwrap();

        let err = manager
            .apply_scanned_url("https://new.example/feed")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));

        // The URL moved forward, the catalog did not
        assert_eq!(
            manager.source_url().unwrap().as_str(),
            "https://new.example/feed"
        );
        assert_eq!(manager.catalog().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_scanned_url_rejects_non_url_payload() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![]);

        let err = manager.apply_scanned_url("not a url").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl { .. }));

        // Neither the stored URL nor the catalog changed
        assert_eq!(manager.source_url().unwrap().as_str(), FEED_URL);
        assert_eq!(
            manager.inner.store.get(PRODUCT_URL_KEY).unwrap().as_deref(),
            Some(FEED_URL)
        );
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_rejected() {
        let started = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        let feed = GatedFeed {
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        };
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = CatalogManager::open(store, feed).expect("open");

        let background = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh().await })
        };

        // Wait until the first refresh is inside the fetch
        started.acquire().await.unwrap().forget();
        assert!(matches!(
            manager.refresh().await,
            Err(CatalogError::RefreshInProgress)
        ));

        release.add_permits(1);
        let catalog = background.await.unwrap().unwrap();
        assert_eq!(catalog.len(), 2);

        // And the guard is released again afterwards: a fresh refresh gets
        // past the in-progress check and into the feed
        release.add_permits(1);
        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh().await })
        };
        started.acquire().await.unwrap().forget();
        assert!(second.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_catalog_snapshots_are_stable_across_swaps() {
        let store = MemoryStore::with_entry(PRODUCT_URL_KEY, FEED_URL);
        let manager = manager_with(store, vec![Ok(products()), Ok(vec![])]);

        manager.refresh().await.unwrap();
        let snapshot = manager.catalog();
        manager.refresh().await.unwrap();

        // The old snapshot still holds the old products; new readers see
        // the swapped-in catalog
        assert_eq!(snapshot.len(), 2);
        assert!(manager.catalog().is_empty());
    }
}
