//! # Catalog
//!
//! Product catalog with a fallback chain. Fetching the product list never
//! fails: when the live API is unavailable the shopper still sees products.
//!
//! ## Fallback Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Fallback Chain                             │
//! │                                                                         │
//! │  GET {base}/product                                                     │
//! │        │ ok ────────────────────────────────────────────► Live          │
//! │        │ err (warn)                                                     │
//! │        ▼                                                                │
//! │  configured fallback file (catalog.fallback_path)                       │
//! │        │ ok ────────────────────────────────────────────► File          │
//! │        │ err / not configured (warn)                                    │
//! │        ▼                                                                │
//! │  bundled snapshot (data/products.json, compiled in)                     │
//! │        │ ok ────────────────────────────────────────────► Bundled       │
//! │        │ err (error)                                                    │
//! │        ▼                                                                │
//! │  empty list ────────────────────────────────────────────► Empty         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-product lookups do not fall back; their errors reach the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use pantry_core::validation::validate_product;
use pantry_core::Product;

use crate::api::CommerceApi;
use crate::error::{ClientError, ClientResult};

/// Snapshot compiled into the binary.
pub const BUNDLED_CATALOG: &str = include_str!("../../../data/products.json");

/// Where a product list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogSource {
    Live,
    File { path: PathBuf },
    Bundled,
    Empty,
}

impl CatalogSource {
    /// True when the list is not from the live API.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, CatalogSource::Live)
    }
}

/// A product list and its origin.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub source: CatalogSource,
}

/// Catalog fetcher.
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn CommerceApi>,
    fallback_path: Option<PathBuf>,
}

impl Catalog {
    pub fn new(api: Arc<dyn CommerceApi>, fallback_path: Option<PathBuf>) -> Self {
        Catalog { api, fallback_path }
    }

    /// Fetches the product list. Never fails; see the module docs.
    pub async fn get_products(&self) -> Vec<Product> {
        self.load().await.products
    }

    /// Fetches the product list along with its source.
    pub async fn load(&self) -> CatalogSnapshot {
        match self.api.get_products().await {
            Ok(products) => {
                let products = keep_valid(products);
                info!(count = products.len(), "Catalog loaded from API");
                return CatalogSnapshot {
                    products,
                    source: CatalogSource::Live,
                };
            }
            Err(e) => warn!(error = %e, "Catalog fetch failed, using fallback data"),
        }

        self.load_fallback()
    }

    /// Fetches one product. Errors are returned, not masked.
    pub async fn get_product(&self, id: &str) -> ClientResult<Product> {
        let product = self.api.get_product(id).await?;
        validate_product(&product)?;
        Ok(product)
    }

    fn load_fallback(&self) -> CatalogSnapshot {
        if let Some(path) = &self.fallback_path {
            match read_catalog_file(path) {
                Ok(products) => {
                    info!(?path, count = products.len(), "Catalog loaded from fallback file");
                    return CatalogSnapshot {
                        products,
                        source: CatalogSource::File { path: path.clone() },
                    };
                }
                Err(e) => warn!(?path, error = %e, "Fallback catalog file unusable"),
            }
        }

        match parse_catalog(BUNDLED_CATALOG) {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded from bundled snapshot");
                CatalogSnapshot {
                    products,
                    source: CatalogSource::Bundled,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to load fallback products");
                CatalogSnapshot {
                    products: Vec::new(),
                    source: CatalogSource::Empty,
                }
            }
        }
    }
}

/// Reads a catalog snapshot file.
pub fn read_catalog_file(path: &Path) -> ClientResult<Vec<Product>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClientError::FallbackUnavailable(format!("{}: {}", path.display(), e)))?;
    parse_catalog(&contents)
}

/// Parses a catalog JSON array, dropping products that fail validation.
pub fn parse_catalog(json: &str) -> ClientResult<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(json)
        .map_err(|e| ClientError::FallbackUnavailable(e.to_string()))?;
    Ok(keep_valid(products))
}

fn keep_valid(products: Vec<Product>) -> Vec<Product> {
    products
        .into_iter()
        .filter(|product| match validate_product(product) {
            Ok(()) => true,
            Err(e) => {
                debug!(id = %product.id, error = %e, "Dropping invalid product");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pantry_core::{OrderRequest, OrderResponse, ProductImage};

    /// Fake API that either serves a fixed list or fails every call.
    struct FakeApi {
        products: Option<Vec<Product>>,
    }

    #[async_trait]
    impl CommerceApi for FakeApi {
        async fn get_products(&self) -> ClientResult<Vec<Product>> {
            self.products
                .clone()
                .ok_or_else(|| ClientError::Connection("connection refused".into()))
        }

        async fn get_product(&self, id: &str) -> ClientResult<Product> {
            self.products
                .as_ref()
                .and_then(|list| list.iter().find(|p| p.id == id).cloned())
                .ok_or_else(|| ClientError::Server {
                    status: 404,
                    message: "Product not found".into(),
                })
        }

        async fn place_order(&self, _request: &OrderRequest) -> ClientResult<OrderResponse> {
            Err(ClientError::Connection("not used".into()))
        }
    }

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "Test".to_string(),
            price_cents,
            image: ProductImage::default(),
        }
    }

    fn catalog(products: Option<Vec<Product>>, fallback_path: Option<PathBuf>) -> Catalog {
        Catalog::new(Arc::new(FakeApi { products }), fallback_path)
    }

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let products = parse_catalog(BUNDLED_CATALOG).unwrap();
        assert_eq!(products.len(), 9);
        assert_eq!(products[0].name, "Waffle with Berries");
        assert_eq!(products[0].price_cents, 650);
    }

    #[test]
    fn test_parse_drops_invalid_products() {
        let json = r#"[
            {"id": "1", "name": "Ok", "category": "C", "price": 1.5,
             "image": {"thumbnail": "", "mobile": "", "tablet": "", "desktop": ""}},
            {"id": "", "name": "No id", "category": "C", "price": 1,
             "image": {"thumbnail": "", "mobile": "", "tablet": "", "desktop": ""}},
            {"id": "3", "name": "Negative", "category": "C", "price": -2,
             "image": {"thumbnail": "", "mobile": "", "tablet": "", "desktop": ""}}
        ]"#;
        let products = parse_catalog(json).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "1");
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_catalog("{not json"),
            Err(ClientError::FallbackUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_live_catalog() {
        let catalog = catalog(Some(vec![product("1", 100), product("2", 200)]), None);
        let snapshot = catalog.load().await;
        assert_eq!(snapshot.source, CatalogSource::Live);
        assert!(!snapshot.source.is_fallback());
        assert_eq!(snapshot.products.len(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_bundled() {
        let catalog = catalog(None, None);
        let snapshot = catalog.load().await;
        assert_eq!(snapshot.source, CatalogSource::Bundled);
        assert_eq!(snapshot.products.len(), 9);
    }

    #[tokio::test]
    async fn test_falls_back_to_configured_file() {
        let path = temp_file(
            r#"[{"id": "x", "name": "Local", "category": "C", "price": 2,
                 "image": {"thumbnail": "", "mobile": "", "tablet": "", "desktop": ""}}]"#,
        );
        let catalog = catalog(None, Some(path.clone()));
        let snapshot = catalog.load().await;
        std::fs::remove_file(&path).unwrap();

        assert_eq!(snapshot.source, CatalogSource::File { path });
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products[0].price_cents, 200);
    }

    #[tokio::test]
    async fn test_broken_file_falls_through_to_bundled() {
        let path = temp_file("not json at all");
        let catalog = catalog(None, Some(path.clone()));
        let products = catalog.get_products().await;
        std::fs::remove_file(&path).unwrap();

        assert_eq!(products.len(), 9);
    }

    #[tokio::test]
    async fn test_get_product_surfaces_errors() {
        let catalog = catalog(Some(vec![product("1", 100)]), None);
        assert_eq!(catalog.get_product("1").await.unwrap().price_cents, 100);
        assert!(matches!(
            catalog.get_product("42").await,
            Err(ClientError::Server { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_product_validates() {
        let catalog = catalog(Some(vec![product("1", -100)]), None);
        assert!(matches!(
            catalog.get_product("1").await,
            Err(ClientError::Validation(_))
        ));
    }
}
