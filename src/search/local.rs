// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local substring matcher
//!
//! Deterministic, no I/O. It is the fallback for every remote failure and
//! the only matcher when no credential is configured.

use async_trait::async_trait;

use super::provider::MatchProvider;
use super::types::normalize_query;
use crate::catalog::CatalogItem;

/// Case-insensitive substring matcher over title and description
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSubstringMatcher;

impl LocalSubstringMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Stable filter of `candidates` by substring match
    ///
    /// An empty or whitespace-only query returns every candidate id.
    pub fn matches(&self, query: &str, candidates: &[CatalogItem]) -> Vec<String> {
        let needle = normalize_query(query).to_lowercase();
        if needle.is_empty() {
            return candidates.iter().map(|c| c.id.clone()).collect();
        }

        candidates
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .map(|item| item.id.clone())
            .collect()
    }
}

#[async_trait]
impl MatchProvider for LocalSubstringMatcher {
    async fn match_query(&self, query: &str, candidates: &[CatalogItem]) -> Vec<String> {
        self.matches(query, candidates)
    }
}
