//! # State Module
//!
//! Session state for the storefront.
//!
//! Instead of one struct that every command locks, each concern gets its
//! own state type and commands take only what they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Storefront                                 │   │
//! │  │  Storefront::from_config(&ClientConfig)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │       ┌──────────────────┬───┴──────────────┬──────────────────┐        │
//! │       ▼                  ▼                  ▼                  ▼        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │  CartState   │  │ CatalogState │  │  OrderState  │  │ConfigState │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  Arc<Mutex<  │  │  Catalog +   │  │  Order-      │  │ store_name │  │
//! │  │    Cart      │  │  last        │  │  Submitter + │  │ api url    │  │
//! │  │  >>          │  │  snapshot    │  │  last conf.  │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: Arc<Mutex<Cart>>, never locked across .await             │
//! │  • CatalogState / OrderState: short std Mutex sections only            │
//! │  • OrderSubmitter: atomic in-flight flag, one order at a time          │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod order;

use std::sync::Arc;

use tracing::info;

use pantry_client::{Catalog, ClientConfig, ClientResult, CommerceApi, HttpCommerceApi, OrderSubmitter};

pub use cart::{CartState, CartTotals};
pub use catalog::CatalogState;
pub use config::ConfigState;
pub use order::OrderState;

/// Everything one shopping session needs.
pub struct Storefront {
    pub cart: CartState,
    pub catalog: CatalogState,
    pub orders: OrderState,
    pub config: ConfigState,
}

impl Storefront {
    /// Builds a session against the HTTP commerce API.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let api = Arc::new(HttpCommerceApi::new(&config.api)?);
        info!(base_url = %api.base_url(), "Commerce API client ready");
        Storefront::with_api(api, config)
    }

    /// Builds a session against any commerce API implementation.
    pub fn with_api(api: Arc<dyn CommerceApi>, config: &ClientConfig) -> ClientResult<Self> {
        let rules = config.discount_rules()?;
        info!(codes = rules.len(), "Discount rules loaded");

        Ok(Storefront {
            cart: CartState::new(rules),
            catalog: CatalogState::new(Catalog::new(
                api.clone(),
                config.catalog.fallback_path.clone(),
            )),
            orders: OrderState::new(OrderSubmitter::new(api)),
            config: ConfigState::from_client_config(config),
        })
    }
}
