//! # Cart State
//!
//! Shared handle to the session's shopping cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may read or modify the cart
//! 2. Only one command should modify it at a time
//!
//! The lock is held for the duration of a closure and never across an
//! `.await`.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Shopper Action           Command                 Cart Change           │
//! │  ──────────────           ───────                 ───────────           │
//! │                                                                         │
//! │  add <id> ───────────────► add_to_cart() ──────► add_item()            │
//! │                                                                         │
//! │  inc / dec / set ────────► *_quantity() ───────► update_quantity()     │
//! │                                                                         │
//! │  rm <id> ────────────────► remove_from_cart() ─► remove_item()         │
//! │                                                                         │
//! │  code / apply ───────────► apply_discount_code()► validate_and_apply   │
//! │                                                                         │
//! │  cart ───────────────────► get_cart() ─────────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use pantry_core::{Cart, DiscountKind, DiscountRules, Money};

/// Cart totals, recomputed from the cart on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Number of distinct lines
    pub line_count: usize,

    /// Sum of quantities across lines
    pub item_count: i64,

    /// Σ price × quantity
    pub subtotal: Money,

    /// Amount taken off by the committed discount code
    pub discount_amount: Money,

    /// Subtotal minus discount
    pub final_total: Money,

    /// Kind of discount in effect, if any
    pub discount_kind: Option<DiscountKind>,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let pricing = cart.pricing();
        CartTotals {
            line_count: cart.line_count(),
            item_count: cart.total_item_count(),
            subtotal,
            discount_amount: pricing.discount_amount,
            final_total: pricing.final_total,
            discount_kind: pricing.kind,
        }
    }
}

/// Thread-safe cart state.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates an empty cart that accepts the given discount codes.
    pub fn new(rules: DiscountRules) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::with_rules(rules))),
        }
    }

    /// Runs a read-only closure against the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Runs a closure that may modify the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock())
    }

    // Cart methods never leave a partial edit, so a poisoned lock is usable.
    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CartState {
    fn default() -> Self {
        CartState::new(DiscountRules::standard())
    }
}
