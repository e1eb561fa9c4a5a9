// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rate limiting for remote match calls

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;

use super::types::MatchError;

const FALLBACK_RPM: NonZeroU32 = match NonZeroU32::new(30) {
    Some(rpm) => rpm,
    None => panic!("fallback rate must be non-zero"),
};

/// Rate limiter for remote match calls
///
/// An exhausted quota does not queue; the caller falls back to local
/// matching for that query.
pub struct MatchRateLimiter {
    limiter: GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
}

impl MatchRateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `requests_per_minute` - Maximum remote calls per minute
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(FALLBACK_RPM);
        Self {
            limiter: GovRateLimiter::direct(Quota::per_minute(rpm)),
            requests_per_minute: rpm.get(),
        }
    }

    /// Check if a remote call is allowed
    ///
    /// Returns Ok(()) if allowed, or MatchError::RateLimited if not
    pub fn check(&self) -> Result<(), MatchError> {
        self.limiter
            .check()
            .map_err(|_| MatchError::RateLimited {
                retry_after_secs: 60,
            })
    }

    /// Get the configured requests per minute
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}
