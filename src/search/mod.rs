// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Catalog search
//!
//! Matches a free-text query against a consultant's catalog:
//! - Remote semantic matching through Gemini when a key is configured
//! - Deterministic local substring matching otherwise, and on any remote failure
//! - Debounced search sessions that never commit stale results
//!
//! Key features:
//! - Credential resolved once from configuration
//! - Remote answers filtered to the candidate set
//! - TTL result caching and per-minute rate limiting of remote calls

pub mod cache;
pub mod config;
pub mod controller;
pub mod gemini;
pub mod local;
pub mod provider;
pub mod rate_limiter;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::SearchConfig;
pub use controller::{ControllerOptions, SearchController, SearchPhase, SearchState};
pub use gemini::GeminiMatcher;
pub use local::LocalSubstringMatcher;
pub use provider::{MatchProvider, SemanticMatcher};
pub use service::SmartSearchService;
pub use types::{
    CandidateSummary, MatchError, MatchOutcome, MatchSource, MatchStatsSnapshot,
};
