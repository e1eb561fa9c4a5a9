// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for catalog search

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::catalog::CatalogItem;

/// Projection of a catalog item sent to the remote matcher
///
/// Only `id`, `title` and `description` ever leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<&CatalogItem> for CandidateSummary {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
        }
    }
}

/// Which path produced a match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Empty query, every candidate returned
    Passthrough,
    /// Remote semantic matcher
    Remote,
    /// Remote result served from cache
    Cached,
    /// Local substring matcher
    Local,
}

/// Result of one match call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Matching candidate ids, no duplicates, all drawn from the candidates
    pub ids: Vec<String>,
    pub source: MatchSource,
}

/// Errors on the remote matching path
///
/// None of these reach the caller of a match; they select the local
/// fallback and are logged and counted.
#[derive(Debug, Error)]
pub enum MatchError {
    /// No credential configured, smart search is off
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing a key
        provider: String,
    },

    /// Local quota for remote calls is exhausted
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Remote call did not finish in time
    #[error("Match timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Non-2xx answer from the provider
    #[error("Match API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with something other than an array of strings
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// What was wrong with the payload
        reason: String,
    },

    /// Smart search switched off in configuration
    #[error("Smart search disabled")]
    SearchDisabled,
}

impl MatchError {
    /// Expected "feature off" conditions, as opposed to transient failures
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::NoApiKey { .. } | Self::SearchDisabled)
    }
}

/// Counters for the remote/fallback split
#[derive(Debug, Default)]
pub struct MatchStats {
    remote_hits: AtomicU64,
    cache_hits: AtomicU64,
    fallback_disabled: AtomicU64,
    fallback_rate_limited: AtomicU64,
    fallback_errors: AtomicU64,
    discarded_ids: AtomicU64,
    local_runs: AtomicU64,
}

/// Point-in-time copy of [`MatchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatsSnapshot {
    pub remote_hits: u64,
    pub cache_hits: u64,
    pub fallback_disabled: u64,
    pub fallback_rate_limited: u64,
    pub fallback_errors: u64,
    /// Ids returned by the remote matcher that were not candidates
    pub discarded_ids: u64,
    pub local_runs: u64,
}

impl MatchStats {
    pub(crate) fn record_remote(&self, discarded: usize) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
        self.discarded_ids
            .fetch_add(discarded as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self, error: &MatchError) {
        let counter = match error {
            MatchError::NoApiKey { .. } | MatchError::SearchDisabled => &self.fallback_disabled,
            MatchError::RateLimited { .. } => &self.fallback_rate_limited,
            _ => &self.fallback_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local(&self) {
        self.local_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MatchStatsSnapshot {
        MatchStatsSnapshot {
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fallback_disabled: self.fallback_disabled.load(Ordering::Relaxed),
            fallback_rate_limited: self.fallback_rate_limited.load(Ordering::Relaxed),
            fallback_errors: self.fallback_errors.load(Ordering::Relaxed),
            discarded_ids: self.discarded_ids.load(Ordering::Relaxed),
            local_runs: self.local_runs.load(Ordering::Relaxed),
        }
    }
}

/// Trim a raw query; whitespace-only becomes empty
pub fn normalize_query(raw: &str) -> &str {
    raw.trim()
}
