//! # pantry-client: Commerce API Client for the Pantry Storefront
//!
//! Everything that talks to the outside world on behalf of the storefront:
//! the product catalog (with its fallback chain), order submission, and the
//! configuration that points both at the commerce API.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        pantry-client                                    │
//! │                                                                         │
//! │   ┌─────────────┐       ┌──────────────────┐                            │
//! │   │   Catalog   │──────►│                  │     GET  /product          │
//! │   └─────────────┘       │   CommerceApi    │     GET  /product/{id}     │
//! │                         │  (trait object)  │────►                       │
//! │   ┌─────────────┐       │                  │     POST /order            │
//! │   │OrderSubmitter──────►│  HttpCommerceApi │                            │
//! │   └─────────────┘       └──────────────────┘                            │
//! │                                                                         │
//! │   ClientConfig (TOML + env) ──► ApiSettings, fallback path, discounts   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use pantry_client::{Catalog, ClientConfig, HttpCommerceApi, OrderSubmitter};
//!
//! # async fn example() -> pantry_client::ClientResult<()> {
//! let config = ClientConfig::load_or_default(None);
//! let api = Arc::new(HttpCommerceApi::new(&config.api)?);
//!
//! let catalog = Catalog::new(api.clone(), config.catalog.fallback_path.clone());
//! let products = catalog.get_products().await;
//!
//! let submitter = OrderSubmitter::new(api);
//! # let _ = (products, submitter);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod order;

pub use api::{CommerceApi, HttpCommerceApi};
pub use catalog::{Catalog, CatalogSnapshot, CatalogSource};
pub use config::{ApiSettings, CatalogSettings, ClientConfig, DiscountEntry, DiscountEntryKind};
pub use error::{ClientError, ClientResult};
pub use order::{ConfirmedLine, OrderConfirmation, OrderSubmitter};
