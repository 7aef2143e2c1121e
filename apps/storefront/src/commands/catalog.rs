//! # Catalog Commands
//!
//! Product listing and lookup.

use serde::Serialize;
use tracing::debug;

use pantry_client::CatalogSource;
use pantry_core::validation::validate_product_id;
use pantry_core::Product;

use crate::error::ApiError;
use crate::state::CatalogState;

/// Product list plus where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    pub source: CatalogSource,
    /// True when the live API could not be used
    pub offline: bool,
}

/// Lists the catalog.
///
/// Never fails: when the API is unreachable the fallback snapshot is
/// returned and `offline` is set.
pub async fn list_products(catalog: &CatalogState) -> CatalogResponse {
    debug!("list_products command");
    let snapshot = catalog.refresh().await;
    CatalogResponse {
        offline: snapshot.source.is_fallback(),
        products: snapshot.products,
        source: snapshot.source,
    }
}

/// Gets a single product from the API. Errors are surfaced.
pub async fn get_product(catalog: &CatalogState, product_id: String) -> Result<Product, ApiError> {
    debug!(product_id = %product_id, "get_product command");
    validate_product_id(&product_id)?;
    Ok(catalog.fetch_product(&product_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{storefront, FakeApi};

    #[tokio::test]
    async fn test_list_products_live() {
        let store = storefront(FakeApi::new());
        let response = list_products(&store.catalog).await;
        assert_eq!(response.source, CatalogSource::Live);
        assert!(!response.offline);
        assert_eq!(response.products.len(), 3);
    }

    #[tokio::test]
    async fn test_list_products_falls_back_offline() {
        let store = storefront(FakeApi::new().catalog_down());
        let response = list_products(&store.catalog).await;
        assert_eq!(response.source, CatalogSource::Bundled);
        assert!(response.offline);
        assert!(!response.products.is_empty());
    }

    #[tokio::test]
    async fn test_get_product_surfaces_errors() {
        let store = storefront(FakeApi::new());
        let product = get_product(&store.catalog, "2".into()).await.unwrap();
        assert_eq!(product.name, "Macaron");

        let err = get_product(&store.catalog, "404".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = get_product(&store.catalog, "".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
