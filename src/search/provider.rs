// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Matcher trait definitions

use async_trait::async_trait;

use super::types::{CandidateSummary, MatchError};
use crate::catalog::CatalogItem;

/// Maps a query and a candidate set to the matching candidate ids
///
/// Implementations never fail: every internal error resolves to some
/// (possibly empty) subset of the candidate ids. The search controller only
/// depends on this trait.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Match `query` against `candidates`
    ///
    /// # Returns
    /// Candidate ids, without duplicates, each drawn from `candidates`
    async fn match_query(&self, query: &str, candidates: &[CatalogItem]) -> Vec<String>;
}

/// Remote semantic matcher
///
/// The answer is untrusted input: callers intersect it with the candidate
/// ids before using it.
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    /// Ask the remote service which candidates match `query`
    ///
    /// # Arguments
    /// * `query` - Trimmed, non-empty query
    /// * `candidates` - Projection of the candidate set
    async fn semantic_match(
        &self,
        query: &str,
        candidates: &[CandidateSummary],
    ) -> Result<Vec<String>, MatchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
