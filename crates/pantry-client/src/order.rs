//! # Order Submission
//!
//! Submits orders with at most one submission in flight, and wraps the
//! server's answer in an [`OrderConfirmation`].
//!
//! ## Submission Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Submission                                  │
//! │                                                                         │
//! │   submit(request)                                                       │
//! │        │                                                                │
//! │        ├── no items? ─────────────────────► Err(EmptyOrder)             │
//! │        │                                                                │
//! │        ├── in_flight already set? ────────► Err(SubmissionInProgress)   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   in_flight = true  (guard held)                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   POST /order  ──► Ok(response) ──► OrderConfirmation                   │
//! │        │                                                                │
//! │        └─────────► Err(Timeout | Server | Connection | Decode)          │
//! │                                                                         │
//! │   guard dropped ──► in_flight = false  (success, failure, or panic)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use pantry_core::{CartLine, DiscountResult, DiscountRules, Money, OrderRequest, OrderResponse, Product};

use crate::api::CommerceApi;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// In-Flight Guard
// =============================================================================

/// Clears the in-flight flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// Sets the flag, or fails if it was already set.
    fn acquire(flag: &'a AtomicBool) -> ClientResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::SubmissionInProgress)?;
        Ok(InFlightGuard { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Order Submitter
// =============================================================================

/// Places orders, one at a time.
#[derive(Clone)]
pub struct OrderSubmitter {
    api: Arc<dyn CommerceApi>,
    in_flight: Arc<AtomicBool>,
}

impl OrderSubmitter {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        OrderSubmitter {
            api,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits an order.
    ///
    /// ## Errors
    /// - `EmptyOrder` for an order without items
    /// - `SubmissionInProgress` if another submission has not completed
    /// - transport or protocol errors from the API, unretried
    pub async fn submit(&self, request: OrderRequest) -> ClientResult<OrderConfirmation> {
        if request.items.is_empty() {
            return Err(ClientError::EmptyOrder);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let submission_id = Uuid::new_v4();

        info!(
            %submission_id,
            items = request.items.len(),
            quantity = request.total_quantity(),
            coupon = ?request.coupon_code,
            "Submitting order"
        );

        match self.api.place_order(&request).await {
            Ok(order) => {
                info!(%submission_id, order_id = %order.id, "Order confirmed");
                Ok(OrderConfirmation::new(order))
            }
            Err(e) => {
                warn!(%submission_id, error = %e, "Order submission failed");
                Err(e)
            }
        }
    }
}

// =============================================================================
// Order Confirmation
// =============================================================================

/// One confirmed item joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedLine {
    pub product: Product,
    pub quantity: i64,
    pub line_total: Money,
}

/// A placed order as the server confirmed it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order: OrderResponse,
    pub confirmed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    pub fn new(order: OrderResponse) -> Self {
        OrderConfirmation {
            order,
            confirmed_at: Utc::now(),
        }
    }

    /// Server-assigned order id.
    pub fn order_id(&self) -> &str {
        &self.order.id
    }

    /// Items joined with their products. Items whose product the server did
    /// not return are skipped.
    pub fn lines(&self) -> Vec<ConfirmedLine> {
        self.order
            .items
            .iter()
            .filter_map(|item| {
                self.order
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|product| ConfirmedLine {
                        product: product.clone(),
                        quantity: item.quantity,
                        line_total: product.price().multiply_quantity(item.quantity),
                    })
            })
            .collect()
    }

    /// Σ price × quantity over items with a known product.
    pub fn order_total(&self) -> Money {
        self.lines().iter().map(|line| line.line_total).sum()
    }

    /// Prices the confirmed order under the coupon the server echoed back.
    pub fn pricing(&self, rules: &DiscountRules) -> DiscountResult {
        let lines: Vec<CartLine> = self
            .lines()
            .iter()
            .map(|line| CartLine::new(&line.product, line.quantity))
            .collect();
        rules.calculate(self.order_total(), self.order.coupon_code.as_deref(), &lines)
    }
}
