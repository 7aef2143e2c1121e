//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Front end                   Rust Backend                               │
//! │  ─────────                   ────────────                               │
//! │                                                                         │
//! │  place_order                                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Client Error? ─── ClientError::Timeout(10) ──────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Domain Error? ─── CoreError::EmptyCart ───────── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "ORDER_FAILED",                                              │
//! │    "message": "The server took too long to respond. Please try again." }│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are shopper-facing. Technical detail goes to the log.

use serde::Serialize;
use tracing::{error, warn};

use pantry_client::ClientError;
use pantry_core::{CoreError, ValidationError};

/// Error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INVALID_DISCOUNT_CODE",
///   "message": "Invalid discount code: bogus"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product or cart line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Discount code not accepted
    InvalidDiscountCode,

    /// Operation needs a non-empty cart
    EmptyCart,

    /// An order is already being placed
    OrderInProgress,

    /// The order could not be placed
    OrderFailed,

    /// The commerce API could not be reached or answered badly
    ServiceUnavailable,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Maps a failed order submission. The cart is untouched by the caller.
    pub fn order_failed(err: ClientError) -> Self {
        match err {
            ClientError::SubmissionInProgress => ApiError::from(err),
            ClientError::EmptyOrder => ApiError::from(err),
            other => {
                warn!(error = %other, "Order failed");
                ApiError::new(ErrorCode::OrderFailed, other.user_message())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InvalidDiscountCode(_) => {
                ApiError::new(ErrorCode::InvalidDiscountCode, err.to_string())
            }
            CoreError::QuantityTooLarge { requested, max } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Quantity {} exceeds maximum allowed ({})", requested, max),
            ),
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, "Your cart is empty"),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts client errors to API errors.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Server { status: 404, .. } => {
                ApiError::new(ErrorCode::NotFound, err.user_message())
            }
            ClientError::Validation(e) => ApiError::validation(e.to_string()),
            ClientError::SubmissionInProgress => {
                ApiError::new(ErrorCode::OrderInProgress, err.user_message())
            }
            ClientError::EmptyOrder => ApiError::new(ErrorCode::EmptyCart, err.user_message()),
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::FallbackUnavailable(_) => {
                error!(error = %err, "Storefront misconfigured");
                ApiError::internal(err.user_message())
            }
            other => {
                warn!(error = %other, "Commerce API call failed");
                ApiError::new(ErrorCode::ServiceUnavailable, other.user_message())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
