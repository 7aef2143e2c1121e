//! # Order State
//!
//! The order submitter and the last confirmation shown to the shopper.

use std::sync::{Mutex, PoisonError};

use pantry_client::{OrderConfirmation, OrderSubmitter};

pub struct OrderState {
    submitter: OrderSubmitter,
    last_confirmation: Mutex<Option<OrderConfirmation>>,
}

impl OrderState {
    pub fn new(submitter: OrderSubmitter) -> Self {
        OrderState {
            submitter,
            last_confirmation: Mutex::new(None),
        }
    }

    pub fn submitter(&self) -> &OrderSubmitter {
        &self.submitter
    }

    /// True while an order is being placed.
    pub fn is_submitting(&self) -> bool {
        self.submitter.is_submitting()
    }

    pub fn remember(&self, confirmation: OrderConfirmation) {
        *self.slot() = Some(confirmation);
    }

    pub fn forget(&self) {
        *self.slot() = None;
    }

    pub fn last_confirmation(&self) -> Option<OrderConfirmation> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<OrderConfirmation>> {
        self.last_confirmation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
