//! # Pantry Storefront Entry Point
//!
//! ## Usage
//! ```text
//! storefront [path/to/storefront.toml]
//! ```
//!
//! All logic lives in `lib.rs`; this file only hands over to `storefront::run`.

use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    storefront::run(config_path).await
}
