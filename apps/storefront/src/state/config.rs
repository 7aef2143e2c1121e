//! # Config State
//!
//! Read-only display configuration for the shell.

use serde::Serialize;

use pantry_client::ClientConfig;

/// Shell display settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the shell banner
    pub store_name: String,

    /// Commerce API the session talks to
    pub api_base_url: String,

    /// True when no API key is configured; orders will be refused
    pub missing_api_key: bool,
}

impl ConfigState {
    pub fn from_client_config(config: &ClientConfig) -> Self {
        ConfigState {
            api_base_url: config.api.base_url.clone(),
            missing_api_key: config.api.api_key.trim().is_empty(),
            ..Default::default()
        }
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Pantry".to_string(),
            api_base_url: pantry_client::config::DEFAULT_API_BASE_URL.to_string(),
            missing_api_key: true,
        }
    }
}
