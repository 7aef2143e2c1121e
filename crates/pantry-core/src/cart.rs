//! # Cart Module
//!
//! The cart state container: ordered lines, the committed discount code,
//! and the discount input the shopper is typing.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Operation                  State Change       │
//! │  ──────────────           ─────────                  ────────────       │
//! │                                                                         │
//! │  Add to cart ───────────► add_item() ──────────────► merge or push     │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ───────► set, or remove    │
//! │                                                      when <= 0          │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ───────────► lines.retain()    │
//! │                                                                         │
//! │  Type a code ───────────► set_discount_input() ────► input text only   │
//! │                                                                         │
//! │  Click apply ───────────► validate_and_apply_      ► commit code, or   │
//! │                           discount_code()            store an error     │
//! │                                                                         │
//! │  New order ─────────────► clear() ─────────────────► full reset        │
//! │                                                                         │
//! │  Totals are never stored: subtotal(), pricing(), final_total()          │
//! │  recompute from (lines, committed code) on every call.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Forgiving Operations
//! No cart operation fails. Non-positive quantities, unknown product ids
//! and unknown discount codes degrade to no-ops or an advisory message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::{normalize_code, DiscountKind, DiscountResult, DiscountRules};
use crate::error::CoreError;
use crate::money::Money;
use crate::types::{CartLine, OrderItem, OrderRequest, Product};

// =============================================================================
// Discount Application Outcome
// =============================================================================

/// Outcome of [`Cart::validate_and_apply_discount_code`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "camelCase")]
#[ts(export)]
pub enum DiscountApplication {
    /// A known code is now committed.
    Applied { code: String, kind: DiscountKind },
    /// The input was empty; any committed code was removed.
    Cleared,
    /// The input did not match a known code. The previous code stays.
    Rejected { input: String },
}

impl DiscountApplication {
    /// `Applied` and `Cleared` both count as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, DiscountApplication::Rejected { .. })
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id and kept in insertion order
/// - Every line has quantity >= 1
/// - `discount_code`, when set by validation, is a normalized known code
///
/// `add_item` does not cap quantities at [`crate::MAX_LINE_QUANTITY`]; the
/// quantity editor above the cart owns that bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    discount_code: Option<String>,
    discount_input: String,
    discount_error: Option<String>,
    #[serde(skip)]
    rules: DiscountRules,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart accepting the built-in discount codes.
    pub fn new() -> Self {
        Cart::with_rules(DiscountRules::standard())
    }

    /// Creates an empty cart with a configured discount rule set.
    pub fn with_rules(rules: DiscountRules) -> Self {
        Cart {
            lines: Vec::new(),
            discount_code: None,
            discount_input: String::new(),
            discount_error: None,
            rules,
            created_at: Utc::now(),
        }
    }

    // -------------------------------------------------------------------------
    // Line Operations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of a product, merging into an existing line.
    ///
    /// Non-positive quantities are ignored.
    pub fn add_item(&mut self, product: &Product, quantity: i64) {
        if quantity <= 0 {
            return;
        }

        match self.line_mut(&product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::new(product, quantity)),
        }
    }

    /// Removes the line for a product. No-op if absent.
    pub fn remove_item(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product_id() != product_id);
    }

    /// Sets a line's quantity. `<= 0` removes the line; unknown ids are
    /// ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
    }

    /// Empties the cart and resets every discount field.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_code = None;
        self.discount_input.clear();
        self.discount_error = None;
        self.created_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Discount Operations
    // -------------------------------------------------------------------------

    /// Commits a code as-is, without validation.
    ///
    /// Unknown codes price as no discount, so this cannot corrupt totals.
    pub fn set_discount_code(&mut self, code: Option<&str>) {
        self.discount_code = code.map(str::to_string);
    }

    /// Records what the shopper has typed. Does not touch the committed code.
    pub fn set_discount_input(&mut self, input: &str) {
        self.discount_input = input.to_string();
    }

    /// Validates the current input and commits it if it is a known code.
    ///
    /// ## Outcomes
    /// ```text
    /// input (trimmed)        committed code     error          result
    /// ───────────────        ──────────────     ─────          ──────
    /// ""                     None               None           Cleared
    /// known ("happyhours")   "HAPPYHOURS"       None           Applied
    /// unknown ("bogus")      unchanged          message        Rejected
    /// ```
    pub fn validate_and_apply_discount_code(&mut self) -> DiscountApplication {
        let code = normalize_code(&self.discount_input);

        if code.is_empty() {
            self.discount_code = None;
            self.discount_error = None;
            return DiscountApplication::Cleared;
        }

        match self.rules.get(&code).map(|rule| rule.kind()) {
            Some(kind) => {
                self.discount_code = Some(code.clone());
                self.discount_error = None;
                DiscountApplication::Applied { code, kind }
            }
            None => {
                let input = self.discount_input.trim().to_string();
                self.discount_error =
                    Some(CoreError::InvalidDiscountCode(input.clone()).to_string());
                DiscountApplication::Rejected { input }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for a product, if present.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    /// The committed discount code.
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    /// The raw text in the discount input.
    pub fn discount_input(&self) -> &str {
        &self.discount_input
    }

    /// Message from the last rejected discount code, if any.
    pub fn discount_error(&self) -> Option<&str> {
        self.discount_error.as_deref()
    }

    /// Discount rules this cart validates against.
    pub fn rules(&self) -> &DiscountRules {
        &self.rules
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -------------------------------------------------------------------------
    // Derived Values
    // -------------------------------------------------------------------------

    /// Σ quantity over all lines.
    pub fn total_item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ price × quantity over all lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Full pricing under the committed code.
    pub fn pricing(&self) -> DiscountResult {
        self.rules
            .calculate(self.subtotal(), self.discount_code(), &self.lines)
    }

    pub fn discount_amount(&self) -> Money {
        self.pricing().discount_amount
    }

    pub fn final_total(&self) -> Money {
        self.pricing().final_total
    }

    /// Builds the order payload from the lines and the committed code.
    pub fn to_order_request(&self) -> OrderRequest {
        OrderRequest {
            items: self.lines.iter().map(OrderItem::from).collect(),
            coupon_code: self.discount_code.clone(),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
