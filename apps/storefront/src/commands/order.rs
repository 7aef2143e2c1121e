//! # Order Commands
//!
//! Review, placement and the confirmation that follows.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Flow                                        │
//! │                                                                         │
//! │  review_order()                                                         │
//! │    │                                                                    │
//! │    ├── cart empty? ───────────────────────► Err(EMPTY_CART)             │
//! │    ├── typed code rejected? ──────────────► Err(INVALID_DISCOUNT_CODE)  │
//! │    ▼                                                                    │
//! │  ReviewResponse { cart, order }                                         │
//! │                                                                         │
//! │  place_order()                                                          │
//! │    │  request built under the cart lock, lock released                  │
//! │    ▼                                                                    │
//! │  OrderSubmitter::submit ──► Err ──► cart untouched, Err(ORDER_FAILED)   │
//! │    │                                                                    │
//! │    ▼ Ok                                                                 │
//! │  cart cleared, confirmation remembered ──► ConfirmationResponse         │
//! │                                                                         │
//! │  start_new_order() ──► empty cart, confirmation forgotten               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use pantry_client::{ConfirmedLine, OrderConfirmation};
use pantry_core::{CoreError, DiscountApplication, DiscountRules, Money, OrderRequest};

use crate::commands::cart::CartResponse;
use crate::error::ApiError;
use crate::state::{CartState, OrderState};

/// What the shopper confirms before placing the order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub cart: CartResponse,
    /// The body that `place_order` will submit
    pub order: OrderRequest,
}

/// A placed order, priced for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
    pub order_id: String,
    pub lines: Vec<ConfirmedLine>,
    pub coupon_code: Option<String>,
    pub order_total: Money,
    pub discount_amount: Money,
    pub final_total: Money,
}

impl ConfirmationResponse {
    pub fn new(confirmation: &OrderConfirmation, rules: &DiscountRules) -> Self {
        let pricing = confirmation.pricing(rules);
        ConfirmationResponse {
            order_id: confirmation.order_id().to_string(),
            lines: confirmation.lines(),
            coupon_code: confirmation.order.coupon_code.clone(),
            order_total: confirmation.order_total(),
            discount_amount: pricing.discount_amount,
            final_total: pricing.final_total,
        }
    }
}

/// Re-validates the discount field and returns the order to confirm.
///
/// Whatever is typed in the field is validated again, so a code edited
/// after the last "apply" is caught before the shopper confirms.
pub fn review_order(cart: &CartState) -> Result<ReviewResponse, ApiError> {
    debug!("review_order command");

    cart.with_cart_mut(|c| {
        if c.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        if let DiscountApplication::Rejected { input } = c.validate_and_apply_discount_code() {
            return Err(CoreError::InvalidDiscountCode(input).into());
        }

        Ok(ReviewResponse {
            cart: CartResponse::from(&*c),
            order: c.to_order_request(),
        })
    })
}

/// Places the order.
///
/// ## Behavior
/// - On success the cart is cleared and the confirmation is kept for display
/// - On failure the cart is left exactly as it was
/// - While a submission is in flight, further calls fail with `ORDER_IN_PROGRESS`
pub async fn place_order(
    cart: &CartState,
    orders: &OrderState,
) -> Result<ConfirmationResponse, ApiError> {
    debug!("place_order command");

    let (request, rules) = cart.with_cart(|c| (c.to_order_request(), c.rules().clone()));
    if request.items.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let confirmation = orders
        .submitter()
        .submit(request)
        .await
        .map_err(ApiError::order_failed)?;

    let response = ConfirmationResponse::new(&confirmation, &rules);
    info!(order_id = %response.order_id, total = %response.final_total, "Order placed");

    cart.with_cart_mut(|c| c.clear());
    orders.remember(confirmation);

    Ok(response)
}

/// Starts over with an empty cart.
pub fn start_new_order(cart: &CartState, orders: &OrderState) -> CartResponse {
    debug!("start_new_order command");

    orders.forget();
    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, apply_discount_code, get_cart, set_discount_input};
    use crate::error::ErrorCode;
    use crate::test_support::{storefront, FakeApi};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_review_empty_cart() {
        let store = storefront(FakeApi::new());
        let err = review_order(&store.cart).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_review_revalidates_typed_code() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();

        set_discount_input(&store.cart, "happyhours".into());
        apply_discount_code(&store.cart);

        // edited but not applied
        set_discount_input(&store.cart, "nope".into());
        let err = review_order(&store.cart).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDiscountCode);
        assert_eq!(err.message, "Invalid discount code: nope");
        assert_eq!(
            get_cart(&store.cart).discount_code.as_deref(),
            Some("HAPPYHOURS")
        );

        set_discount_input(&store.cart, "buygetone".into());
        let review = review_order(&store.cart).unwrap();
        assert_eq!(review.order.coupon_code.as_deref(), Some("BUYGETONE"));
        assert_eq!(review.order.items.len(), 1);
        assert_eq!(review.order.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_place_order_clears_cart_on_success() {
        let store = storefront(FakeApi::new());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();
        add_to_cart(&store.catalog, &store.cart, "2".into(), Some(1)).await.unwrap();
        set_discount_input(&store.cart, "HAPPYHOURS".into());
        apply_discount_code(&store.cart);

        let confirmation = place_order(&store.cart, &store.orders).await.unwrap();
        assert_eq!(confirmation.order_id, "order-1");
        assert_eq!(confirmation.lines.len(), 2);
        assert_eq!(confirmation.order_total.cents(), 1300);
        assert_eq!(confirmation.discount_amount.cents(), 234);
        assert_eq!(confirmation.final_total.cents(), 1066);

        assert!(get_cart(&store.cart).is_empty());
        assert!(store.orders.last_confirmation().is_some());

        let cart = start_new_order(&store.cart, &store.orders);
        assert!(cart.is_empty());
        assert!(store.orders.last_confirmation().is_none());
    }

    #[tokio::test]
    async fn test_place_order_failure_preserves_cart() {
        let store = storefront(FakeApi::new().orders_down());
        add_to_cart(&store.catalog, &store.cart, "1".into(), Some(2)).await.unwrap();
        set_discount_input(&store.cart, "BUYGETONE".into());
        apply_discount_code(&store.cart);

        let err = place_order(&store.cart, &store.orders).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderFailed);
        assert_eq!(err.message, "Kitchen closed");

        let cart = get_cart(&store.cart);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.discount_code.as_deref(), Some("BUYGETONE"));
        assert!(store.orders.last_confirmation().is_none());
    }

    #[tokio::test]
    async fn test_place_order_empty_cart() {
        let store = storefront(FakeApi::new());
        let err = place_order(&store.cart, &store.orders).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_only_one_order_in_flight() {
        let api = FakeApi::new().order_delay(Duration::from_millis(200));
        let store = Arc::new(storefront(api));
        add_to_cart(&store.catalog, &store.cart, "1".into(), None).await.unwrap();

        let first = {
            let store = store.clone();
            tokio::spawn(async move { place_order(&store.cart, &store.orders).await })
        };
        for _ in 0..100 {
            if store.orders.is_submitting() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let err = place_order(&store.cart, &store.orders).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInProgress);

        assert!(first.await.unwrap().is_ok());
        assert!(get_cart(&store.cart).is_empty());
    }
}
