//! Product feed client.
//!
//! The feed is a plain HTTP endpoint returning a JSON array of
//! `{id, name, price}` objects. The trait seam exists so the manager can
//! be exercised against stub feeds in tests.

use std::future::Future;
use std::time::Duration;

use kasse_core::Product;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Fetches the remote product list.
pub trait ProductFeed {
    /// Fetch and decode the product list at `url`.
    fn fetch_products(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Vec<Product>, FetchError>> + Send;
}

/// HTTP implementation of [`ProductFeed`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProductFeed {
    client: reqwest::Client,
}

impl HttpProductFeed {
    /// Create a feed client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ProductFeed for HttpProductFeed {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_products(&self, url: &Url) -> Result<Vec<Product>, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        // Body as text first for better diagnostics on decode failures
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "product feed returned non-success status"
            );
            return Err(FetchError::Status(status));
        }

        match serde_json::from_str::<Vec<Product>>(&body) {
            Ok(products) => {
                debug!(count = products.len(), "product feed decoded");
                Ok(products)
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    body = %body.chars().take(200).collect::<String>(),
                    "product feed body is not a valid product list"
                );
                Err(FetchError::Decode(error))
            }
        }
    }
}
