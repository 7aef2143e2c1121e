//! # pantry-core: Pure Business Logic for the Pantry Storefront
//!
//! This crate is the **heart** of the storefront. It contains the cart and
//! discount rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pantry Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front End (terminal / browser)                  │   │
//! │  │    Catalog view ──► Cart view ──► Review ──► Confirmation       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pantry-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ discount  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  Rules    │  │   │
//! │  │   │  Order*   │  │  percent  │  │ CartLine  │  │  Result   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               pantry-client (Commerce API client)               │   │
//! │  │          catalog fetch + fallback, order submission             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, OrderRequest, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`discount`] - The pricing engine: discount codes and rules
//! - [`cart`] - The cart state container
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pantry_core::discount::{calculate_discount, DiscountKind};
//! use pantry_core::money::Money;
//!
//! let subtotal = Money::from_cents(1300); // $13.00
//! let result = calculate_discount(subtotal, Some("happyhours"), &[]);
//!
//! assert_eq!(result.discount_amount.cents(), 234);
//! assert_eq!(result.final_total.cents(), 1066);
//! assert_eq!(result.kind, Some(DiscountKind::Percentage));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, DiscountApplication};
pub use discount::{calculate_discount, DiscountKind, DiscountResult, DiscountRule, DiscountRules};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest quantity a cart line can hold.
pub const MIN_LINE_QUANTITY: i64 = 1;

/// Largest quantity the quantity editor allows on a single line.
///
/// ## Where It Is Enforced
/// Only the quantity-editing layer checks this bound. `Cart::add_item`
/// merges quantities without clamping, so repeated adds can pass it.
pub const MAX_LINE_QUANTITY: i64 = 99;

/// Code for the 18% off happy-hours promotion.
pub const HAPPYHOURS_CODE: &str = "HAPPYHOURS";

/// Code for the cheapest-line-free promotion.
pub const BUYGETONE_CODE: &str = "BUYGETONE";

/// HAPPYHOURS rate in basis points (1800 = 18%).
pub const HAPPYHOURS_DISCOUNT_BPS: u32 = 1800;
