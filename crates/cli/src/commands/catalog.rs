//! Catalog and feed source commands.

use std::sync::Arc;

use kasse_core::Catalog;

use super::{CURRENCY_CODE, Manager};

/// Print the active product list, fetching it first if none is loaded.
pub async fn show(manager: &Manager) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ensure_catalog(manager).await?;
    if catalog.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }
    for product in catalog.iter() {
        println!(
            "{:<40} {:>12}   {}",
            product.name,
            product.price.display_with(CURRENCY_CODE),
            product.id
        );
    }
    Ok(())
}

/// Print the configured feed URL and when it was last fetched.
pub fn show_source(manager: &Manager) {
    match manager.source_url() {
        Some(url) => println!("Feed URL: {url}"),
        None => println!("No product feed URL configured."),
    }
    match manager.last_fetched_at() {
        Some(at) => println!("Last fetched: {at}"),
        None => println!("Last fetched: never"),
    }
}

/// Record a new feed URL without fetching.
pub fn set_source(manager: &Manager, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    manager.set_source_url(url)?;
    println!("Feed URL saved. Run `kasse source refresh` to load products.");
    Ok(())
}

/// Apply a scanned QR payload: record the URL and refresh.
pub async fn scan_source(
    manager: &Manager,
    payload: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = manager.apply_scanned_url(payload).await?;
    println!("Loaded {} products from the scanned source.", catalog.len());
    Ok(())
}

/// Re-fetch the product list from the configured URL.
pub async fn refresh(manager: &Manager) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = manager.refresh().await?;
    println!("Loaded {} products.", catalog.len());
    Ok(())
}

/// The active catalog, fetched on first use.
pub async fn ensure_catalog(
    manager: &Manager,
) -> Result<Arc<Catalog>, Box<dyn std::error::Error>> {
    let catalog = manager.catalog();
    if !catalog.is_empty() {
        return Ok(catalog);
    }
    if !manager.is_configured() {
        return Err(
            "no product feed URL configured; run `kasse source set <url>` or scan a QR code"
                .into(),
        );
    }
    Ok(manager.refresh().await?)
}
