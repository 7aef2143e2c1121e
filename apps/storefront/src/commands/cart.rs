//! # Cart Commands
//!
//! Cart manipulation, the quantity editor, and the discount code field.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Review  │────►│ Confirmed│       │
//! │  │  Cart    │     │          │     │          │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                 │                │             │
//! │       │           add_to_cart       review_order     place_order       │
//! │       │           *_quantity        (order.rs)       (order.rs)        │
//! │       │           apply_discount_code                     │             │
//! │       │                │                                  │             │
//! │       │                ▼                                  │             │
//! │       └────────── clear_cart ◄──────── start_new_order ◄──┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quantity Bounds
//! The cart itself accepts any positive quantity. The editor commands here
//! keep shopper edits inside `1..=99`; setting 0 removes the line.

use serde::Serialize;
use tracing::debug;

use pantry_core::validation::{validate_product_id, validate_quantity};
use pantry_core::{Cart, CoreError, DiscountApplication, Money, Product, MAX_LINE_QUANTITY};

use crate::error::ApiError;
use crate::state::{CartState, CartTotals, CatalogState};

/// One cart line as the front end shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product: Product,
    pub quantity: i64,
    pub line_total: Money,
    /// The increase button is disabled at the editor's maximum
    pub at_max_quantity: bool,
    /// Line holds more than the editor allows (merged adds)
    pub exceeds_limit: bool,
}

/// Cart response including lines, totals and the discount field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineView>,
    pub totals: CartTotals,
    /// Committed, validated code
    pub discount_code: Option<String>,
    /// What the shopper has typed
    pub discount_input: String,
    /// Inline message from the last rejected code
    pub discount_error: Option<String>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    product: line.product.clone(),
                    quantity: line.quantity,
                    line_total: line.line_total(),
                    at_max_quantity: line.quantity >= MAX_LINE_QUANTITY,
                    exceeds_limit: line.exceeds_quantity_limit(),
                })
                .collect(),
            totals: CartTotals::from(cart),
            discount_code: cart.discount_code().map(str::to_string),
            discount_input: cart.discount_input().to_string(),
            discount_error: cart.discount_error().map(str::to_string),
        }
    }
}

impl CartResponse {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Result of pressing "apply" on the discount field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub outcome: DiscountApplication,
    pub cart: CartResponse,
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a product to the cart.
///
/// ## Arguments
/// * `product_id` - Catalog id of the product
/// * `quantity` - Quantity to add (default: 1)
///
/// ## Behavior
/// If the product is already in the cart, its quantity grows by `quantity`.
pub async fn add_to_cart(
    catalog: &CatalogState,
    cart: &CartState,
    product_id: String,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let qty = quantity.unwrap_or(1);
    debug!(product_id = %product_id, qty = qty, "add_to_cart command");

    validate_product_id(&product_id)?;
    validate_quantity(qty)?;

    // Resolved before locking the cart
    let product = catalog.find_product(&product_id).await?;

    Ok(cart.with_cart_mut(|c| {
        c.add_item(&product, qty);
        CartResponse::from(&*c)
    }))
}

/// Sets a line's quantity. Zero removes the line.
pub fn update_cart_item(
    cart: &CartState,
    product_id: String,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = quantity, "update_cart_item command");

    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_LINE_QUANTITY,
        }
        .into());
    }
    if quantity != 0 {
        validate_quantity(quantity)?;
    }

    cart.with_cart_mut(|c| {
        require_line(c, &product_id)?;
        c.update_quantity(&product_id, quantity);
        Ok(CartResponse::from(&*c))
    })
}

/// Adds one to a line, stopping at the editor's maximum.
pub fn increase_quantity(cart: &CartState, product_id: String) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "increase_quantity command");

    cart.with_cart_mut(|c| {
        let current = require_line(c, &product_id)?;
        if current < MAX_LINE_QUANTITY {
            c.update_quantity(&product_id, current + 1);
        }
        Ok(CartResponse::from(&*c))
    })
}

/// Takes one from a line. A line at 1 is removed.
pub fn decrease_quantity(cart: &CartState, product_id: String) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "decrease_quantity command");

    cart.with_cart_mut(|c| {
        let current = require_line(c, &product_id)?;
        c.update_quantity(&product_id, current - 1);
        Ok(CartResponse::from(&*c))
    })
}

/// Removes a line. Removing a product that is not in the cart is a no-op.
pub fn remove_from_cart(cart: &CartState, product_id: String) -> CartResponse {
    debug!(product_id = %product_id, "remove_from_cart command");

    cart.with_cart_mut(|c| {
        c.remove_item(&product_id);
        CartResponse::from(&*c)
    })
}

/// Clears the cart and the discount field.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

/// Records what the shopper typed into the discount field.
///
/// Emptying the field also removes the committed code.
pub fn set_discount_input(cart: &CartState, input: String) -> CartResponse {
    debug!(input = %input, "set_discount_input command");

    cart.with_cart_mut(|c| {
        c.set_discount_input(&input);
        if input.trim().is_empty() {
            c.validate_and_apply_discount_code();
        }
        CartResponse::from(&*c)
    })
}

/// Validates the typed code and commits it if known.
///
/// An unknown code is not an error here: the cart keeps its previous code
/// and carries the inline message in `discount_error`.
pub fn apply_discount_code(cart: &CartState) -> DiscountResponse {
    debug!("apply_discount_code command");

    cart.with_cart_mut(|c| {
        let outcome = c.validate_and_apply_discount_code();
        debug!(?outcome, "Discount code applied");
        DiscountResponse {
            outcome,
            cart: CartResponse::from(&*c),
        }
    })
}

/// Current quantity of a line. A product with no line is not found.
fn require_line(cart: &Cart, product_id: &str) -> Result<i64, ApiError> {
    cart.line(product_id)
        .map(|line| line.quantity)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{storefront, FakeApi};
    use pantry_core::DiscountKind;

    #[tokio::test]
    async fn test_add_merges_lines() {
        let store = storefront(FakeApi::new());

        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();
        let response = add_to_cart(&store.catalog, &store.cart, "1".into(), Some(3))
            .await
            .unwrap();

        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].quantity, 5);
        assert_eq!(response.totals.subtotal.cents(), 2500);
    }

    #[tokio::test]
    async fn test_add_defaults_to_one() {
        let store = storefront(FakeApi::new());
        let response = add_to_cart(&store.catalog, &store.cart, "2".into(), None)
            .await
            .unwrap();
        assert_eq!(response.totals.item_count, 1);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let store = storefront(FakeApi::new());

        let err = add_to_cart(&store.catalog, &store.cart, "1".into(), Some(0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_to_cart(&store.catalog, &store.cart, "404".into(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(get_cart(&store.cart).is_empty());
    }

    #[tokio::test]
    async fn test_add_works_offline_from_snapshot() {
        let store = storefront(FakeApi::new().catalog_down());
        crate::commands::catalog::list_products(&store.catalog).await;

        let response = add_to_cart(&store.catalog, &store.cart, "1".into(), None)
            .await
            .unwrap();
        assert_eq!(response.lines[0].product.name, "Waffle with Berries");
    }

    #[tokio::test]
    async fn test_update_cart_item_bounds() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();

        let response = update_cart_item(&store.cart, "1".into(), 7).unwrap();
        assert_eq!(response.lines[0].quantity, 7);

        let err = update_cart_item(&store.cart, "1".into(), 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_cart_item(&store.cart, "1".into(), -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_cart_item(&store.cart, "3".into(), 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 3");

        let response = update_cart_item(&store.cart, "1".into(), 0).unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_increase_stops_at_max() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(98)).await.unwrap();

        let response = increase_quantity(&store.cart, "1".into()).unwrap();
        assert_eq!(response.lines[0].quantity, 99);
        assert!(response.lines[0].at_max_quantity);

        let response = increase_quantity(&store.cart, "1".into()).unwrap();
        assert_eq!(response.lines[0].quantity, 99);
    }

    #[tokio::test]
    async fn test_decrease_to_zero_removes() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();

        let response = decrease_quantity(&store.cart, "1".into()).unwrap();
        assert_eq!(response.lines[0].quantity, 1);

        let response = decrease_quantity(&store.cart, "1".into()).unwrap();
        assert!(response.is_empty());

        let err = decrease_quantity(&store.cart, "1".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_merged_adds_flag_the_limit() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(60)).await.unwrap();
        let response = add_to_cart(&store.catalog, &store.cart, "1".into(), Some(60))
            .await
            .unwrap();

        assert_eq!(response.lines[0].quantity, 120);
        assert!(response.lines[0].exceeds_limit);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), None).await.unwrap();
        add_to_cart(&store.catalog, &store.cart, "2".into(), None).await.unwrap();

        let response = remove_from_cart(&store.cart, "1".into());
        assert_eq!(response.lines.len(), 1);

        let response = remove_from_cart(&store.cart, "ghost".into());
        assert_eq!(response.lines.len(), 1);

        set_discount_input(&store.cart, "HAPPYHOURS".into());
        apply_discount_code(&store.cart);
        let response = clear_cart(&store.cart);
        assert!(response.is_empty());
        assert_eq!(response.discount_code, None);
        assert_eq!(response.discount_input, "");
    }

    #[tokio::test]
    async fn test_discount_field_flow() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();
        add_to_cart(&store.catalog, &store.cart, "2".into(), Some(1)).await.unwrap();

        set_discount_input(&store.cart, " buygetone ".into());
        let response = apply_discount_code(&store.cart);
        assert!(response.outcome.is_success());
        assert_eq!(response.cart.discount_code.as_deref(), Some("BUYGETONE"));
        assert_eq!(response.cart.totals.discount_kind, Some(DiscountKind::FreeItem));
        assert_eq!(response.cart.totals.discount_amount.cents(), 300);
        assert_eq!(response.cart.totals.final_total.cents(), 1000);

        set_discount_input(&store.cart, "bogus".into());
        let response = apply_discount_code(&store.cart);
        assert!(!response.outcome.is_success());
        assert_eq!(response.cart.discount_code.as_deref(), Some("BUYGETONE"));
        assert_eq!(
            response.cart.discount_error.as_deref(),
            Some("Invalid discount code: bogus")
        );

        // emptying the field drops the committed code
        let response = set_discount_input(&store.cart, "".into());
        assert_eq!(response.discount_code, None);
        assert_eq!(response.discount_error, None);
        assert_eq!(response.totals.final_total.cents(), 1300);
    }
}
