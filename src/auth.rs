//! Authentication configuration loading
//!
//! Loads API keys and provider settings from:
//! - $XDG_DATA_HOME/claw/auth.json (preferred)
//! - ~/.local/share/claw/auth.json (fallback)
//! - ~/.claw/auth.json (legacy)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Authentication entry for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthEntry {
    /// Simple API key authentication
    #[serde(rename = "api")]
    Api {
        key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl AuthEntry {
    /// Get the API key
    pub fn api_key(&self) -> &str {
        match self {
            AuthEntry::Api { key, .. } => key,
        }
    }

    /// Get the base URL if configured
    pub fn base_url(&self) -> Option<&str> {
        match self {
            AuthEntry::Api { base_url, .. } => base_url.as_deref(),
        }
    }
}

/// Authentication configuration file, keyed by provider id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthConfig {
    pub providers: HashMap<String, AuthEntry>,
}

impl AuthConfig {
    /// Load auth config from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load auth config from a specific path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AuthConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        // XDG data dir (honors $XDG_DATA_HOME)
        if let Some(data_dir) = dirs::data_dir() {
            let path = data_dir.join("claw/auth.json");
            if path.exists() {
                return path;
            }
        }

        // Legacy ~/.claw/auth.json
        if let Some(home) = dirs::home_dir() {
            let legacy = home.join(".claw/auth.json");
            if legacy.exists() {
                return legacy;
            }
        }

        // Default to the XDG location even if it doesn't exist yet
        dirs::data_dir()
            .map(|d| d.join("claw/auth.json"))
            .unwrap_or_else(|| PathBuf::from(".claw/auth.json"))
    }

    /// Get auth entry for a provider
    pub fn get(&self, provider: &str) -> Option<&AuthEntry> {
        self.providers.get(provider)
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.providers.get(provider).map(|e| e.api_key())
    }

    /// Get base URL for a provider
    pub fn base_url(&self, provider: &str) -> Option<&str> {
        self.providers.get(provider).and_then(|e| e.base_url())
    }

    /// List all configured providers
    pub fn providers(&self) -> impl Iterator<Item = &String> {
        self.providers.keys()
    }
}
