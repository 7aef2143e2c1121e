//! # Pantry Storefront Application
//!
//! Terminal storefront for the Pantry dessert shop. Browse the catalog,
//! build a cart, apply a discount code, and place an order against the
//! commerce API.
//!
//! ## Module Structure
//! ```text
//! storefront/
//! ├── main.rs          ◄─── Binary entry point (calls lib::run)
//! ├── lib.rs           ◄─── You are here (setup, logging)
//! ├── error.rs         ◄─── ApiError type for commands
//! ├── shell.rs         ◄─── Line-oriented terminal front end
//! ├── commands/
//! │   ├── catalog.rs   ◄─── list_products, get_product
//! │   ├── cart.rs      ◄─── Cart, quantity editor, discount field
//! │   └── order.rs     ◄─── review_order, place_order, start_new_order
//! └── state/
//!     ├── mod.rs       ◄─── Storefront session
//!     ├── cart.rs      ◄─── CartState (Arc<Mutex<Cart>>)
//!     ├── catalog.rs   ◄─── CatalogState (fetcher + last snapshot)
//!     ├── order.rs     ◄─── OrderState (submitter + last confirmation)
//!     └── config.rs    ◄─── ConfigState (display settings)
//! ```

pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pantry_client::ClientConfig;

pub use error::{ApiError, ErrorCode};
pub use state::Storefront;

/// Runs the storefront until stdin closes or the shopper quits.
///
/// ## Initialization Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Storefront Startup                                   │
/// │                                                                         │
/// │  1. Initialize Tracing ───────────────────────────────────────────────► │
/// │     • RUST_LOG or the default filter, written to stderr                 │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • explicit path: errors are fatal                                   │
/// │     • otherwise: platform config dir, falling back to defaults          │
/// │                                                                         │
/// │  3. Build Session ────────────────────────────────────────────────────► │
/// │     • HTTP client, catalog, order submitter, empty cart                 │
/// │                                                                         │
/// │  4. Run Shell ────────────────────────────────────────────────────────► │
/// │     • stdin lines in, views out on stdout                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Pantry Storefront");

    let config = match config_path {
        Some(path) => ClientConfig::load(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load_or_default(None),
    };

    let store = Storefront::from_config(&config).context("Failed to set up storefront")?;
    info!("Session ready");

    let stdin = BufReader::new(tokio::io::stdin());
    shell::run_shell(&store, stdin, tokio::io::stdout())
        .await
        .context("Terminal I/O failed")?;

    info!("Storefront closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pantry=trace` - Show trace for pantry crates only
/// - Default: INFO, DEBUG for pantry and storefront
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pantry=debug,storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use pantry_client::{ClientConfig, ClientError, ClientResult, CommerceApi};
    use pantry_core::{OrderRequest, OrderResponse, Product, ProductImage};

    use crate::state::Storefront;

    fn product(id: &str, name: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Dessert".to_string(),
            price_cents,
            image: ProductImage::default(),
        }
    }

    /// In-memory commerce API.
    pub struct FakeApi {
        products: Vec<Product>,
        catalog_down: bool,
        orders_down: bool,
        order_delay: Option<Duration>,
        orders: AtomicUsize,
    }

    impl FakeApi {
        pub fn new() -> Self {
            FakeApi {
                products: vec![
                    product("1", "Waffle", 500),
                    product("2", "Macaron", 300),
                    product("3", "Brownie", 450),
                ],
                catalog_down: false,
                orders_down: false,
                order_delay: None,
                orders: AtomicUsize::new(0),
            }
        }

        pub fn catalog_down(mut self) -> Self {
            self.catalog_down = true;
            self
        }

        pub fn orders_down(mut self) -> Self {
            self.orders_down = true;
            self
        }

        pub fn order_delay(mut self, delay: Duration) -> Self {
            self.order_delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl CommerceApi for FakeApi {
        async fn get_products(&self) -> ClientResult<Vec<Product>> {
            if self.catalog_down {
                return Err(ClientError::Connection("connection refused".into()));
            }
            Ok(self.products.clone())
        }

        async fn get_product(&self, id: &str) -> ClientResult<Product> {
            if self.catalog_down {
                return Err(ClientError::Connection("connection refused".into()));
            }
            self.products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ClientError::Server {
                    status: 404,
                    message: "Product not found".into(),
                })
        }

        async fn place_order(&self, request: &OrderRequest) -> ClientResult<OrderResponse> {
            if let Some(delay) = self.order_delay {
                tokio::time::sleep(delay).await;
            }
            if self.orders_down {
                return Err(ClientError::Server {
                    status: 500,
                    message: "Kitchen closed".into(),
                });
            }
            let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(OrderResponse {
                id: format!("order-{}", n),
                items: request.items.clone(),
                products: self
                    .products
                    .iter()
                    .filter(|p| request.items.iter().any(|i| i.product_id == p.id))
                    .cloned()
                    .collect(),
                coupon_code: request.coupon_code.clone(),
            })
        }
    }

    /// A session over `api` with the standard discount codes.
    pub fn storefront(api: FakeApi) -> Storefront {
        let mut config = ClientConfig::default();
        config.api.api_key = "test-key".into();
        Storefront::with_api(Arc::new(api), &config).unwrap()
    }
}
