//! # Catalog State
//!
//! The catalog fetcher plus the last product list shown to the shopper.
//! `add_to_cart` resolves ids against that list first so adding an item
//! works offline once the fallback catalog has been displayed.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use pantry_client::{Catalog, CatalogSnapshot, ClientResult};
use pantry_core::Product;

/// Catalog fetcher with the most recent snapshot.
pub struct CatalogState {
    catalog: Catalog,
    snapshot: Mutex<Option<CatalogSnapshot>>,
}

impl CatalogState {
    pub fn new(catalog: Catalog) -> Self {
        CatalogState {
            catalog,
            snapshot: Mutex::new(None),
        }
    }

    /// Fetches the product list (with fallback) and remembers it.
    pub async fn refresh(&self) -> CatalogSnapshot {
        let snapshot = self.catalog.load().await;
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        snapshot
    }

    /// Looks a product up in the last snapshot.
    pub fn cached_product(&self, id: &str) -> Option<Product> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|s| s.products.iter().find(|p| p.id == id).cloned())
    }

    /// Resolves a product from the last snapshot, then from the API.
    pub async fn find_product(&self, id: &str) -> ClientResult<Product> {
        if let Some(product) = self.cached_product(id) {
            return Ok(product);
        }
        debug!(product_id = %id, "Product not in snapshot, fetching");
        self.catalog.get_product(id).await
    }

    /// Fetches one product from the API, bypassing the snapshot.
    pub async fn fetch_product(&self, id: &str) -> ClientResult<Product> {
        self.catalog.get_product(id).await
    }
}
