//! # Client Error Types
//!
//! Error types for catalog fetches, order submission and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Timeout        │  │  Server { status, msg } │ │
//! │  │  InvalidUrl     │  │  Connection     │  │  Decode                 │ │
//! │  │  ConfigLoad     │  │                 │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                               │
//! │  │   Submission    │  │    Catalog      │                               │
//! │  │                 │  │                 │                               │
//! │  │  InProgress     │  │  Fallback       │                               │
//! │  │  EmptyOrder     │  │  Unavailable    │                               │
//! │  └─────────────────┘  └─────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use pantry_core::ValidationError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every way a call to the commerce API (or its fallbacks) can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Base URL does not parse or is not http(s).
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The server could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// The server answered with a non-success status.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A product or discount rule failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// The fallback snapshot could not be read or parsed.
    #[error("Fallback catalog unavailable: {0}")]
    FallbackUnavailable(String),

    // =========================================================================
    // Submission Errors
    // =========================================================================
    /// Another order submission has not completed yet.
    #[error("An order submission is already in progress")]
    SubmissionInProgress,

    /// Orders need at least one item.
    #[error("Order has no items")]
    EmptyOrder,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl ClientError {
    /// Maps a reqwest failure, naming the timeout that applied.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout.as_secs())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// True if repeating the same read could succeed.
    ///
    /// Order posts are never retried regardless of this flag.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Connection(_) => true,
            ClientError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
        )
    }

    /// True if the server answered but the answer was unusable.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ClientError::Server { .. } | ClientError::Decode(_) | ClientError::Validation(_)
        )
    }

    /// Text suitable for showing to a shopper.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Timeout(_) => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ClientError::Connection(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            ClientError::Server { status, .. } => {
                format!("The server rejected the request (status {}).", status)
            }
            ClientError::Decode(_) | ClientError::Validation(_) => {
                "The server sent an unexpected response.".to_string()
            }
            ClientError::SubmissionInProgress => {
                "Your order is already being placed. Please wait.".to_string()
            }
            ClientError::EmptyOrder => "Your cart is empty.".to_string(),
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::FallbackUnavailable(_) => {
                "The store is misconfigured. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Timeout(10).is_retryable());
        assert!(ClientError::Connection("refused".into()).is_retryable());
        assert!(ClientError::Server {
            status: 503,
            message: String::new()
        }
        .is_retryable());

        assert!(!ClientError::Server {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ClientError::Decode("eof".into()).is_retryable());
        assert!(!ClientError::SubmissionInProgress.is_retryable());
    }

    #[test]
    fn test_categories() {
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(ClientError::Decode("x".into()).is_protocol_error());
        assert!(!ClientError::Timeout(1).is_protocol_error());
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ClientError::Server {
            status: 422,
            message: "Invalid product".into(),
        };
        assert_eq!(err.user_message(), "Invalid product");

        let err = ClientError::Server {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(
            err.user_message(),
            "The server rejected the request (status 500)."
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClientError::Timeout(10).to_string(),
            "Request timed out after 10 seconds"
        );
        assert_eq!(
            ClientError::SubmissionInProgress.to_string(),
            "An order submission is already in progress"
        );
    }
}
