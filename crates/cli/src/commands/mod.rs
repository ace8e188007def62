//! CLI command implementations.

pub mod catalog;
pub mod sell;

use kasse_client::{CatalogManager, ClientConfig, HttpProductFeed, JsonFileStore};

/// Literal currency-code prefix used for all displayed amounts.
pub const CURRENCY_CODE: &str = "CHF";

/// The concrete manager the shell runs with.
pub type Manager = CatalogManager<JsonFileStore, HttpProductFeed>;

/// Open the catalog manager with file-backed settings and the HTTP feed.
///
/// Seeds the feed URL from `KASSE_PRODUCT_URL` on first launch; afterwards
/// the persisted value wins.
pub fn open_manager(config: &ClientConfig) -> Result<Manager, Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(&config.state_path);
    let feed = HttpProductFeed::new(config.http_timeout)?;
    let manager = CatalogManager::open(store, feed)?;

    if let Some(url) = &config.product_url
        && manager.seed_source_url(url)?
    {
        tracing::info!(%url, "seeded product feed URL from environment");
    }

    Ok(manager)
}
