//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  OrderRequest   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product        │──►│  items[]        │       │
//! │  │  name           │   │  quantity       │   │   productId     │       │
//! │  │  category       │   │  added_at       │   │   quantity      │       │
//! │  │  price_cents    │   └─────────────────┘   │  couponCode?    │       │
//! │  │  image          │                         └────────┬────────┘       │
//! │  └─────────────────┘                                  │ POST /order    │
//! │                                                       ▼                │
//! │                                              ┌─────────────────┐       │
//! │                                              │  OrderResponse  │       │
//! │                                              │  id, items,     │       │
//! │                                              │  products,      │       │
//! │                                              │  couponCode?    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! These types double as the commerce API's JSON shapes (camelCase, decimal
//! `price`). Prices become cents during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// Image variants for a product, one per breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductImage {
    pub thumbnail: String,
    pub mobile: String,
    pub tablet: String,
    pub desktop: String,
}

/// A product in the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Catalog identifier (opaque string, e.g. "1").
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category label (e.g. "Waffle", "Cake").
    pub category: String,

    /// Unit price in cents. Travels as a decimal `price` on the wire.
    #[serde(rename = "price", with = "crate::money::decimal")]
    #[ts(type = "number")]
    pub price_cents: i64,

    /// Image variant URLs.
    pub image: ProductImage,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart.
///
/// ## Design Notes
/// The product is a snapshot taken when the line was created, so the cart
/// keeps pricing consistently even if the catalog is refetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product snapshot.
    pub product: Product,

    /// Quantity on this line. Always >= 1 while the line exists.
    #[ts(type = "number")]
    pub quantity: i64,

    /// When the line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line for a product.
    pub fn new(product: &Product, quantity: i64) -> Self {
        CartLine {
            product: product.clone(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns the product id of this line.
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }

    /// True when the line holds more than the quantity editor allows.
    #[inline]
    pub fn exceeds_quantity_limit(&self) -> bool {
        self.quantity > crate::MAX_LINE_QUANTITY
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One item of an order as the commerce API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    #[ts(type = "number")]
    pub quantity: i64,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        OrderItem {
            product_id: line.product.id.clone(),
            quantity: line.quantity,
        }
    }
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,

    /// Committed discount code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub coupon_code: Option<String>,
}

impl OrderRequest {
    /// Total quantity across all items.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Response of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderResponse {
    /// Server-assigned order id.
    pub id: String,

    /// Items as accepted by the server.
    pub items: Vec<OrderItem>,

    /// Products referenced by `items`.
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub coupon_code: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
