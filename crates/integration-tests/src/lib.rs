//! Integration test support for Kasse.
//!
//! Provides a [`StubFeed`]: a local HTTP server that plays the role of the
//! remote product feed, with a response that tests can swap at runtime to
//! simulate catalog updates, outages, and malformed payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! let feed = StubFeed::spawn(StubFeed::COFFEE_AND_CAKE).await;
//! let manager = CatalogManager::open(
//!     MemoryStore::new(),
//!     HttpProductFeed::new(Duration::from_secs(5))?,
//! )?;
//! manager.apply_scanned_url(&feed.url()).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use parking_lot::RwLock;

/// The canned response the stub currently serves.
struct StubResponse {
    status: StatusCode,
    body: String,
}

type Shared = Arc<RwLock<StubResponse>>;

/// A local HTTP server standing in for the remote product feed.
pub struct StubFeed {
    addr: SocketAddr,
    response: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl StubFeed {
    /// The product list used by the standard sale scenario:
    /// two products, Coffee at 3.50 and Cake at 4.00.
    pub const COFFEE_AND_CAKE: &'static str = r#"[
        {"id": "p1", "name": "Coffee", "price": 3.50},
        {"id": "p2", "name": "Cake", "price": 4.00}
    ]"#;

    /// Start the stub on an ephemeral local port, serving `body` with 200.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound (test environment only).
    pub async fn spawn(body: &str) -> Self {
        let response = Arc::new(RwLock::new(StubResponse {
            status: StatusCode::OK,
            body: body.to_owned(),
        }));

        let app = Router::new()
            .route("/products.json", get(serve))
            .with_state(Arc::clone(&response));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub feed listener");
        let addr = listener.local_addr().expect("stub feed local addr");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub feed");
        });

        Self {
            addr,
            response,
            server,
        }
    }

    /// The feed URL tests hand to the catalog manager.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/products.json", self.addr)
    }

    /// Swap the served product list (status 200).
    pub fn set_products(&self, body: &str) {
        let mut response = self.response.write();
        response.status = StatusCode::OK;
        response.body = body.to_owned();
    }

    /// Serve an arbitrary status and body, e.g. a 500 outage.
    pub fn respond_with(&self, status: StatusCode, body: &str) {
        let mut response = self.response.write();
        response.status = status;
        response.body = body.to_owned();
    }
}

impl Drop for StubFeed {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve(State(state): State<Shared>) -> (StatusCode, String) {
    let response = state.read();
    (response.status, response.body.clone())
}
