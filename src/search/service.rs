// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Smart search service
//!
//! Composes the remote semantic matcher with the local substring matcher.
//! Every failure on the remote side resolves to the local result.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{CacheStats, MatchCache};
use super::config::SearchConfig;
use super::gemini::GeminiMatcher;
use super::local::LocalSubstringMatcher;
use super::provider::{MatchProvider, SemanticMatcher};
use super::rate_limiter::MatchRateLimiter;
use super::types::{
    normalize_query, CandidateSummary, MatchError, MatchOutcome, MatchSource, MatchStats,
    MatchStatsSnapshot,
};
use crate::catalog::CatalogItem;

/// Catalog matcher with remote-first, local-fallback semantics
///
/// The cache, rate-limit quota and counters belong to the service. Sessions
/// sharing one service through an `Arc` share all three, so the quota is per
/// service rather than per session.
pub struct SmartSearchService {
    remote: Option<Box<dyn SemanticMatcher>>,
    local: LocalSubstringMatcher,
    cache: MatchCache,
    rate_limiter: MatchRateLimiter,
    stats: MatchStats,
    config: SearchConfig,
}

impl SmartSearchService {
    /// Create a service from configuration
    ///
    /// The credential is read from `config` once; without it the service
    /// runs local-only for its whole lifetime.
    pub fn new(config: SearchConfig) -> Self {
        let remote: Option<Box<dyn SemanticMatcher>> = if !config.enabled {
            debug!("Smart search disabled by configuration, using local matching");
            None
        } else {
            match GeminiMatcher::from_config(&config) {
                Ok(matcher) => {
                    debug!("Gemini matcher enabled (model {})", matcher.model());
                    Some(Box::new(matcher))
                }
                Err(MatchError::NoApiKey { .. }) => {
                    debug!("No smart search API key, using local matching");
                    None
                }
                Err(e) => {
                    warn!("Gemini matcher unavailable: {}, using local matching", e);
                    None
                }
            }
        };

        Self::assemble(config, remote)
    }

    /// Create a service around a specific remote matcher
    pub fn with_matcher(config: SearchConfig, matcher: Box<dyn SemanticMatcher>) -> Self {
        Self::assemble(config, Some(matcher))
    }

    /// Create a service that never leaves the process
    pub fn local_only(config: SearchConfig) -> Self {
        Self::assemble(config, None)
    }

    fn assemble(config: SearchConfig, remote: Option<Box<dyn SemanticMatcher>>) -> Self {
        let cache = MatchCache::new(config.cache_ttl_secs, config.cache_max_entries);
        let rate_limiter = MatchRateLimiter::new(config.rate_limit_per_minute);

        Self {
            remote,
            local: LocalSubstringMatcher::new(),
            cache,
            rate_limiter,
            stats: MatchStats::default(),
            config,
        }
    }

    /// Match a query against the candidate set
    ///
    /// Never fails. An empty query passes every candidate through in order.
    pub async fn search(&self, query: &str, candidates: &[CatalogItem]) -> MatchOutcome {
        let query = normalize_query(query);
        if query.is_empty() {
            return MatchOutcome {
                ids: candidates.iter().map(|c| c.id.clone()).collect(),
                source: MatchSource::Passthrough,
            };
        }

        if candidates.is_empty() {
            return self.local_search(query, candidates);
        }

        match self.remote_search(query, candidates).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.record_fallback(&e);
                if e.is_disabled() {
                    debug!("Remote matching skipped: {}", e);
                } else {
                    warn!("Remote matching failed: {}, falling back to local", e);
                }
                self.local_search(query, candidates)
            }
        }
    }

    async fn remote_search(
        &self,
        query: &str,
        candidates: &[CatalogItem],
    ) -> Result<MatchOutcome, MatchError> {
        let remote = self.remote.as_ref().ok_or_else(|| {
            if self.config.enabled {
                MatchError::NoApiKey {
                    provider: "gemini".to_string(),
                }
            } else {
                MatchError::SearchDisabled
            }
        })?;

        if let Some(ids) = self.cache.get(query, candidates) {
            debug!("Cache hit for query: {}", query);
            self.stats.record_cache_hit();
            let (ids, _) = retain_candidates(ids, candidates);
            return Ok(MatchOutcome {
                ids,
                source: MatchSource::Cached,
            });
        }

        self.rate_limiter.check()?;

        let summaries: Vec<CandidateSummary> = candidates.iter().map(CandidateSummary::from).collect();
        let start = Instant::now();
        let timeout = self.config.request_timeout();

        let raw = tokio::time::timeout(timeout, remote.semantic_match(query, &summaries))
            .await
            .map_err(|_| MatchError::Timeout {
                timeout_ms: self.config.request_timeout_ms,
            })??;

        let (ids, discarded) = retain_candidates(raw, candidates);
        if discarded > 0 {
            warn!(
                "{} returned {} ids outside the candidate set, dropped",
                remote.name(),
                discarded
            );
        }

        self.stats.record_remote(discarded);
        self.cache.insert(query, candidates, &ids);

        info!(
            "Smart search complete: {} of {} candidates from {} in {}ms",
            ids.len(),
            candidates.len(),
            remote.name(),
            start.elapsed().as_millis()
        );

        Ok(MatchOutcome {
            ids,
            source: MatchSource::Remote,
        })
    }

    fn local_search(&self, query: &str, candidates: &[CatalogItem]) -> MatchOutcome {
        self.stats.record_local();
        MatchOutcome {
            ids: self.local.matches(query, candidates),
            source: MatchSource::Local,
        }
    }

    /// Whether a remote matcher is configured
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Remote/fallback counters
    pub fn stats(&self) -> MatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Clear the remote result cache
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl MatchProvider for SmartSearchService {
    async fn match_query(&self, query: &str, candidates: &[CatalogItem]) -> Vec<String> {
        self.search(query, candidates).await.ids
    }
}

/// Keep ids that name a candidate, first occurrence only
///
/// Returns the kept ids and how many were dropped as unknown. Repeats of a
/// known id are not counted as unknown.
fn retain_candidates(ids: Vec<String>, candidates: &[CatalogItem]) -> (Vec<String>, usize) {
    let known: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(ids.len());
    let mut kept = Vec::with_capacity(ids.len());
    let mut discarded = 0;

    for id in ids {
        if !known.contains(id.as_str()) {
            discarded += 1;
        } else if seen.insert(id.clone()) {
            kept.push(id);
        }
    }

    (kept, discarded)
}
