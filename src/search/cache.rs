// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL cache for remote match results
//!
//! Keyed by the normalized query plus the ordered candidate projection, so a
//! result computed for one category, or before a catalog edit, never answers
//! for another.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::catalog::CatalogItem;

/// TTL-based cache for remote match results
pub struct MatchCache {
    cache: RwLock<HashMap<String, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

struct CachedEntry {
    ids: Vec<String>,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet evicted)
    pub expired: usize,
    /// Maximum cache capacity
    pub max: usize,
}

impl MatchCache {
    /// Create a new match cache
    ///
    /// # Arguments
    /// * `ttl_secs` - Time-to-live for cache entries in seconds
    /// * `max_entries` - Maximum number of entries to store
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        }
    }

    /// Cached ids for a query over these candidates
    ///
    /// Returns None if not found or expired
    pub fn get(&self, query: &str, candidates: &[CatalogItem]) -> Option<Vec<String>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(&Self::cache_key(query, candidates))?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None; // Expired
        }

        Some(entry.ids.clone())
    }

    /// Insert ids into cache
    pub fn insert(&self, query: &str, candidates: &[CatalogItem], ids: &[String]) {
        if self.max_entries == 0 {
            return;
        }

        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return,
        };

        let key = Self::cache_key(query, candidates);
        if !cache.contains_key(&key) && cache.len() >= self.max_entries {
            Self::evict_oldest(&mut cache);
        }

        cache.insert(
            key,
            CachedEntry {
                ids: ids.to_vec(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let cache = match self.cache.read() {
            Ok(c) => c,
            Err(_) => {
                return CacheStats {
                    total: 0,
                    expired: 0,
                    max: self.max_entries,
                }
            }
        };

        CacheStats {
            total: cache.len(),
            expired: cache
                .values()
                .filter(|e| e.inserted_at.elapsed() > self.ttl)
                .count(),
            max: self.max_entries,
        }
    }

    /// Remove expired entries from cache
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| entry.inserted_at.elapsed() <= self.ttl);
        }
    }

    /// Normalized query followed by every candidate's id, title and
    /// description, each length-prefixed so no field can run into the next
    fn cache_key(query: &str, candidates: &[CatalogItem]) -> String {
        let mut key = query.trim().to_lowercase();
        for item in candidates {
            for field in [&item.id, &item.title, &item.description] {
                key.push_str(&format!("{}:", field.len()));
                key.push_str(field);
            }
        }
        key
    }

    fn evict_oldest(cache: &mut HashMap<String, CachedEntry>) {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest_key);
        }
    }
}
