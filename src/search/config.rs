// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for catalog search
//!
//! The remote credential is resolved once here and handed to the matcher at
//! construction; nothing probes the environment per call.

use std::env;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Configuration for catalog search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Whether the remote semantic matcher may be used at all
    pub enabled: bool,
    /// Remote provider settings
    pub provider: SmartSearchProviderConfig,
    /// Remote call timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Remote calls allowed per minute
    pub rate_limit_per_minute: u32,
    /// Cache TTL for remote results in seconds
    pub cache_ttl_secs: u64,
    /// Maximum cached remote results
    pub cache_max_entries: usize,
    /// Quiet period before a query settles, in milliseconds
    pub debounce_ms: u64,
    /// Abort the running match task when a newer cycle starts
    pub abort_superseded: bool,
}

/// Remote provider settings
#[derive(Debug, Clone)]
pub struct SmartSearchProviderConfig {
    /// Gemini API key; `None` disables the remote path
    pub api_key: Option<String>,
    /// Model used for `generateContent`
    pub model: String,
    /// Base URL of the Generative Language API
    pub endpoint: String,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            // Set SMART_SEARCH_ENABLED=false to force local matching
            enabled: env::var("SMART_SEARCH_ENABLED")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            provider: SmartSearchProviderConfig {
                api_key: resolve_api_key(
                    env::var("GEMINI_API_KEY").ok(),
                    env::var("API_KEY").ok(),
                ),
                model: env::var("SMART_SEARCH_MODEL")
                    .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                endpoint: env::var("SMART_SEARCH_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            },
            request_timeout_ms: env::var("SMART_SEARCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            rate_limit_per_minute: env::var("SMART_SEARCH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_per_minute),
            cache_ttl_secs: env::var("SMART_SEARCH_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            cache_max_entries: defaults.cache_max_entries,
            debounce_ms: env::var("SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debounce_ms),
            abort_superseded: env::var("SEARCH_ABORT_SUPERSEDED")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.rate_limit_per_minute == 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }
        if self.debounce_ms == 0 {
            return Err("Debounce window must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether the remote matcher can be built from this configuration
    pub fn has_remote(&self) -> bool {
        self.enabled && self.provider.api_key.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: SmartSearchProviderConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                endpoint: DEFAULT_ENDPOINT.to_string(),
            },
            request_timeout_ms: 8000,
            rate_limit_per_minute: 30,
            cache_ttl_secs: 300,
            cache_max_entries: 256,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            abort_superseded: false,
        }
    }
}

/// First non-blank key wins; blank keys count as absent
fn resolve_api_key(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    [primary, legacy]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
