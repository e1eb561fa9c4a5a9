// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Debounced search session for one catalog view
//!
//! Every keystroke or candidate-set change opens a new cycle. A cycle waits
//! out the debounce window, then runs one match. Results are committed only
//! by the cycle that is still current when its match completes, so a late
//! reply from a superseded cycle can never overwrite newer results.
//!
//! `set_query` and `set_candidates` spawn onto the ambient tokio runtime and
//! must be called from within it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::config::{SearchConfig, DEFAULT_DEBOUNCE_MS};
use super::provider::MatchProvider;
use crate::catalog::{visible_items, CatalogItem};

/// Where a search session is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Results reflect the debounced query over the current candidates
    Idle,
    /// Waiting for input to pause
    Debouncing,
    /// Match call in flight
    Matching,
}

/// Snapshot of a search session, as exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub raw_query: String,
    pub debounced_query: String,
    /// Candidate ids in catalog order
    pub candidate_ids: Vec<String>,
    pub result_ids: Vec<String>,
    pub is_pending: bool,
    pub phase: SearchPhase,
    /// Id of the newest cycle
    pub cycle: u64,
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Quiet period before a query settles
    pub debounce: Duration,
    /// Abort the in-flight match task of a superseded cycle instead of
    /// letting it finish and discarding its result
    pub abort_superseded: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            abort_superseded: false,
        }
    }
}

impl From<&SearchConfig> for ControllerOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            abort_superseded: config.abort_superseded,
        }
    }
}

struct Session {
    state: SearchState,
    candidates: Arc<Vec<CatalogItem>>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    session: Mutex<Session>,
    state_tx: watch::Sender<SearchState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &Session) {
        self.state_tx.send_replace(session.state.clone());
    }
}

/// Debounced search over one candidate set
///
/// Dropping the controller aborts any outstanding cycle.
pub struct SearchController {
    provider: Arc<dyn MatchProvider>,
    options: ControllerOptions,
    shared: Arc<Shared>,
}

impl SearchController {
    /// Create a session over `candidates` with an empty query
    ///
    /// The initial results are every candidate id, which is what an empty
    /// query matches.
    pub fn new(
        provider: Arc<dyn MatchProvider>,
        candidates: Vec<CatalogItem>,
        options: ControllerOptions,
    ) -> Self {
        let candidate_ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
        let state = SearchState {
            raw_query: String::new(),
            debounced_query: String::new(),
            result_ids: candidate_ids.clone(),
            candidate_ids,
            is_pending: false,
            phase: SearchPhase::Idle,
            cycle: 0,
        };

        let (state_tx, _) = watch::channel(state.clone());
        let shared = Arc::new(Shared {
            session: Mutex::new(Session {
                state,
                candidates: Arc::new(candidates),
                task: None,
            }),
            state_tx,
        });

        Self {
            provider,
            options,
            shared,
        }
    }

    /// Create a session using the debounce settings from `config`
    pub fn from_config(
        provider: Arc<dyn MatchProvider>,
        candidates: Vec<CatalogItem>,
        config: &SearchConfig,
    ) -> Self {
        Self::new(provider, candidates, ControllerOptions::from(config))
    }

    /// Record a keystroke and restart the debounce window
    pub fn set_query(&self, text: impl Into<String>) {
        let mut session = self.shared.lock();
        session.state.raw_query = text.into();
        self.start_cycle(&mut session);
    }

    /// Replace the candidate set (e.g. after a category change)
    ///
    /// Treated like a keystroke: any in-flight match loses authority.
    pub fn set_candidates(&self, candidates: Vec<CatalogItem>) {
        let mut session = self.shared.lock();
        session.state.candidate_ids = candidates.iter().map(|c| c.id.clone()).collect();
        session.candidates = Arc::new(candidates);
        self.start_cycle(&mut session);
    }

    fn start_cycle(&self, session: &mut Session) {
        if let Some(task) = session.task.take() {
            // A debouncing task has done no work yet, so aborting it is the
            // timer restart. A matching task is only aborted on request.
            let abort = match session.state.phase {
                SearchPhase::Debouncing => true,
                SearchPhase::Matching => self.options.abort_superseded,
                SearchPhase::Idle => false,
            };
            if abort {
                task.abort();
            }
        }

        session.state.cycle += 1;
        session.state.phase = SearchPhase::Debouncing;
        session.state.is_pending = false;

        let cycle = session.state.cycle;
        let query = session.state.raw_query.clone();
        let candidates = Arc::clone(&session.candidates);
        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(&self.provider);
        let debounce = self.options.debounce;

        session.task = Some(tokio::spawn(run_cycle(
            shared, provider, debounce, cycle, query, candidates,
        )));
        self.shared.publish(session);
    }

    /// Current snapshot
    pub fn state(&self) -> SearchState {
        self.shared.state_tx.borrow().clone()
    }

    /// Ids of the last committed result
    pub fn result_ids(&self) -> Vec<String> {
        self.shared.state_tx.borrow().result_ids.clone()
    }

    /// Whether the current cycle's match is in flight
    pub fn is_pending(&self) -> bool {
        self.shared.state_tx.borrow().is_pending
    }

    /// Current candidates that are in the result set, in candidate order
    pub fn visible_items(&self) -> Vec<CatalogItem> {
        let session = self.shared.lock();
        visible_items(&session.candidates, &session.state.result_ids)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state_tx.subscribe()
    }

    /// Wait until the session is idle and return that state
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| state.phase == SearchPhase::Idle).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(task) = self.shared.lock().task.take() {
            task.abort();
        }
    }
}

async fn run_cycle(
    shared: Arc<Shared>,
    provider: Arc<dyn MatchProvider>,
    debounce: Duration,
    cycle: u64,
    query: String,
    candidates: Arc<Vec<CatalogItem>>,
) {
    tokio::time::sleep(debounce).await;

    {
        let mut session = shared.lock();
        if session.state.cycle != cycle {
            return;
        }
        session.state.debounced_query = query.clone();
        session.state.phase = SearchPhase::Matching;
        session.state.is_pending = true;
        shared.publish(&session);
    }

    let ids = provider.match_query(&query, &candidates).await;

    let mut session = shared.lock();
    if session.state.cycle != cycle {
        debug!(
            "Discarding results of cycle {} (current cycle {})",
            cycle, session.state.cycle
        );
        return;
    }

    session.state.result_ids = ids;
    session.state.is_pending = false;
    session.state.phase = SearchPhase::Idle;
    session.task = None;
    shared.publish(&session);
}
