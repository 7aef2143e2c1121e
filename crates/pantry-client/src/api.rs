//! # Commerce API
//!
//! The [`CommerceApi`] seam and its reqwest implementation.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Commerce API Calls                                 │
//! │                                                                         │
//! │  get_products()  ──► GET  {base}/product        ──► [Product]           │
//! │  get_product(id) ──► GET  {base}/product/{id}   ──► Product             │
//! │  place_order()   ──► POST {base}/order          ──► OrderResponse       │
//! │                      header: api_key                                    │
//! │                                                                         │
//! │  Reads:   retried on timeout / connection / 5xx, exponential backoff    │
//! │  Orders:  sent exactly once; the caller decides what to do on failure   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use pantry_core::validation::validate_product_id;
use pantry_core::{OrderRequest, OrderResponse, Product};

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};

/// Header carrying the API key on order posts.
pub const API_KEY_HEADER: &str = "api_key";

/// Longest server message surfaced in errors.
const MAX_SERVER_MESSAGE_CHARS: usize = 200;

// =============================================================================
// Commerce API Trait
// =============================================================================

/// Operations the storefront needs from the commerce backend.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Fetches the full catalog.
    async fn get_products(&self) -> ClientResult<Vec<Product>>;

    /// Fetches one product by id.
    async fn get_product(&self, id: &str) -> ClientResult<Product>;

    /// Places an order. Implementations must not retry.
    async fn place_order(&self, request: &OrderRequest) -> ClientResult<OrderResponse>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// reqwest-backed [`CommerceApi`].
#[derive(Debug, Clone)]
pub struct HttpCommerceApi {
    http: Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
    read_retries: u32,
    initial_backoff: Duration,
}

impl HttpCommerceApi {
    /// Builds a client from validated settings.
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let base_url = settings.parsed_base_url()?;
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpCommerceApi {
            http,
            base_url,
            api_key: settings.api_key.clone(),
            timeout: settings.timeout(),
            read_retries: settings.read_retries,
            initial_backoff: settings.initial_backoff(),
        })
    }

    /// The base URL endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with retries for transient failures.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.read_retries => {
                    attempt += 1;
                    let delay = backoff.next_backoff().unwrap_or(self.initial_backoff);
                    warn!(%url, attempt, ?delay, error = %e, "Read failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> ClientResult<T> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        self.read_json(response).await
    }

    /// Checks the status and decodes the body.
    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.timeout,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CommerceApi for HttpCommerceApi {
    async fn get_products(&self) -> ClientResult<Vec<Product>> {
        let url = self.endpoint(&["product"])?;
        self.get_json(url).await
    }

    async fn get_product(&self, id: &str) -> ClientResult<Product> {
        validate_product_id(id)?;
        let url = self.endpoint(&["product", id.trim()])?;
        self.get_json(url).await
    }

    async fn place_order(&self, request: &OrderRequest) -> ClientResult<OrderResponse> {
        let url = self.endpoint(&["order"])?;
        debug!(%url, items = request.items.len(), "POST order");

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        self.read_json(response).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Extracts a human-readable message from an error body.
///
/// Prefers a JSON `message` or `error` field, falls back to the raw text.
fn server_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    from_json
        .unwrap_or_else(|| body.trim().to_string())
        .chars()
        .take(MAX_SERVER_MESSAGE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpCommerceApi {
        HttpCommerceApi::new(&ApiSettings {
            base_url: base_url.to_string(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joining() {
        let api = client("https://orderfoodonline.deno.dev/api");
        assert_eq!(
            api.endpoint(&["product"]).unwrap().as_str(),
            "https://orderfoodonline.deno.dev/api/product"
        );

        let api = client("http://localhost:8080/api/");
        assert_eq!(
            api.endpoint(&["product", "7"]).unwrap().as_str(),
            "http://localhost:8080/api/product/7"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://localhost:8080/api");
        assert_eq!(
            api.endpoint(&["product", "a/b c"]).unwrap().as_str(),
            "http://localhost:8080/api/product/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = HttpCommerceApi::new(&ApiSettings {
            base_url: "mailto:shop@example.com".into(),
            ..ApiSettings::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_server_message() {
        assert_eq!(server_message(r#"{"message": "Invalid product"}"#), "Invalid product");
        assert_eq!(server_message(r#"{"error": "Unauthorized"}"#), "Unauthorized");
        assert_eq!(server_message("  plain text  "), "plain text");
        assert_eq!(server_message(""), "");
        assert_eq!(server_message(&"x".repeat(500)).len(), MAX_SERVER_MESSAGE_CHARS);
    }
}
