//! # Commands Module
//!
//! Every operation the storefront front end can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Product listing and lookup
//! ├── cart.rs     ◄─── Cart, quantity editor, discount field
//! └── order.rs    ◄─── Review, placement, new order
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Terminal shell                                                         │
//! │  ──────────────                                                         │
//! │  > add 3 2                                                              │
//! │         │                                                               │
//! │         │ (parse_command)                                               │
//! │         ▼                                                               │
//! │  Rust command                                                           │
//! │  ────────────                                                           │
//! │  async fn add_to_cart(                                                  │
//! │      catalog: &CatalogState,  ◄── Only the state it needs               │
//! │      cart: &CartState,                                                  │
//! │      product_id: String,                                                │
//! │      quantity: Option<i64>,                                             │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Shell renders: CartResponse or ApiError.message                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Responses are `Serialize` (camelCase) so any front end can consume them.

pub mod cart;
pub mod catalog;
pub mod order;
