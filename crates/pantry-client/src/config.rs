//! # Client Configuration
//!
//! Configuration for the commerce API client, the catalog fallback and the
//! accepted discount codes.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PANTRY_API_BASE_URL=https://orderfoodonline.deno.dev/api           │
//! │     PANTRY_API_KEY=...                                                 │
//! │     PANTRY_API_TIMEOUT_SECS=10                                         │
//! │     PANTRY_READ_RETRIES=1                                              │
//! │     PANTRY_FALLBACK_CATALOG=/srv/products.json                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.pantry.storefront/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     public demo API, 10s timeout, HAPPYHOURS + BUYGETONE               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "https://orderfoodonline.deno.dev/api"
//! api_key = "..."
//! timeout_secs = 10
//! read_retries = 1
//! initial_backoff_ms = 250
//!
//! [catalog]
//! fallback_path = "/srv/storefront/products.json"
//!
//! [[discounts]]
//! code = "HAPPYHOURS"
//! kind = "percentage"
//! bps = 1800
//!
//! [[discounts]]
//! code = "BUYGETONE"
//! kind = "cheapest_line_free"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use pantry_core::{DiscountRule, DiscountRules, BUYGETONE_CODE, HAPPYHOURS_CODE, HAPPYHOURS_DISCOUNT_BPS};

use crate::error::{ClientError, ClientResult};

/// Public demo endpoint of the commerce API.
pub const DEFAULT_API_BASE_URL: &str = "https://orderfoodonline.deno.dev/api";

// =============================================================================
// API Settings
// =============================================================================

/// Connection settings for the commerce API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; endpoints are appended as path segments.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as the `api_key` header on order posts.
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts for failed catalog reads. Orders are never retried.
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// First retry delay (milliseconds); doubles per attempt.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_read_retries() -> u32 {
    1
}
fn default_initial_backoff() -> u64 {
    250
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            read_retries: default_read_retries(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Parses and checks the base URL.
    pub fn parsed_base_url(&self) -> ClientResult<url::Url> {
        let url = url::Url::parse(&self.base_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::InvalidUrl(format!(
                "API URL must use http or https, got: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where to find the catalog when the live fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Snapshot file tried before the bundled one.
    #[serde(default)]
    pub fallback_path: Option<PathBuf>,
}

// =============================================================================
// Discount Entries
// =============================================================================

/// Rule kinds as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountEntryKind {
    Percentage,
    CheapestLineFree,
}

/// One `[[discounts]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountEntry {
    pub code: String,
    pub kind: DiscountEntryKind,

    /// Basis points; required for `percentage`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bps: Option<u32>,
}

impl DiscountEntry {
    /// Converts the entry into a pricing rule.
    pub fn to_rule(&self) -> ClientResult<DiscountRule> {
        match (self.kind, self.bps) {
            (DiscountEntryKind::Percentage, Some(bps)) => Ok(DiscountRule::Percentage { bps }),
            (DiscountEntryKind::Percentage, None) => Err(ClientError::InvalidConfig(format!(
                "discount '{}' is a percentage but has no bps",
                self.code
            ))),
            (DiscountEntryKind::CheapestLineFree, _) => Ok(DiscountRule::CheapestLineFree),
        }
    }
}

fn default_discounts() -> Vec<DiscountEntry> {
    vec![
        DiscountEntry {
            code: HAPPYHOURS_CODE.to_string(),
            kind: DiscountEntryKind::Percentage,
            bps: Some(HAPPYHOURS_DISCOUNT_BPS),
        },
        DiscountEntry {
            code: BUYGETONE_CODE.to_string(),
            kind: DiscountEntryKind::CheapestLineFree,
            bps: None,
        },
    ]
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Accepted discount codes. Omitting the table keeps the built-in pair.
    #[serde(default = "default_discounts")]
    pub discounts: Vec<DiscountEntry>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api: ApiSettings::default(),
            catalog: CatalogSettings::default(),
            discounts: default_discounts(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        if config.api.api_key.is_empty() {
            warn!("No API key configured; order submission will likely be rejected");
        }

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> ClientResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.api.parsed_base_url()?;

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        self.discount_rules()?;

        Ok(())
    }

    /// Builds the discount rule set from the `[[discounts]]` entries.
    pub fn discount_rules(&self) -> ClientResult<DiscountRules> {
        let mut rules = DiscountRules::empty();
        for entry in &self.discounts {
            rules.add_rule(&entry.code, entry.to_rule()?)?;
        }
        Ok(rules)
    }

    /// Applies overrides from the process environment.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PANTRY_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Some(key) = lookup("PANTRY_API_KEY") {
            self.api.api_key = key;
        }

        if let Some(timeout) = lookup("PANTRY_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid PANTRY_API_TIMEOUT_SECS"),
            }
        }

        if let Some(retries) = lookup("PANTRY_READ_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.api.read_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid PANTRY_READ_RETRIES"),
            }
        }

        if let Some(path) = lookup("PANTRY_FALLBACK_CATALOG") {
            debug!(path = %path, "Overriding fallback catalog from environment");
            self.catalog.fallback_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pantry", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}
