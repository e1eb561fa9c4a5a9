// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Debounce timing, stale-result discard and session integration

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use vitrine::{
    filter_by_category, CategorySelection, ControllerOptions, SearchConfig, SearchController,
    SearchPhase, SmartSearchService,
};

use super::common::*;

fn options(abort_superseded: bool) -> ControllerOptions {
    ControllerOptions {
        debounce: Duration::from_millis(500),
        abort_superseded,
    }
}

async fn settle_tasks() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

// Scenario E: three keystrokes 50ms apart issue a single match
#[tokio::test(start_paused = true)]
async fn test_burst_of_keystrokes_issues_one_call() {
    init_tracing();
    let provider = Arc::new(RecordingProvider::new().respond("cak", &["a"], Duration::ZERO));
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    controller.set_query("c");
    sleep(Duration::from_millis(50)).await;
    controller.set_query("ca");
    sleep(Duration::from_millis(50)).await;
    controller.set_query("cak");

    let state = controller.settled().await;

    assert_eq!(provider.calls(), vec!["cak"]);
    assert_eq!(state.result_ids, vec!["a"]);
    assert_eq!(state.debounced_query, "cak");
    assert_eq!(state.cycle, 3);
    assert!(!state.is_pending);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_window_boundary() {
    let provider = Arc::new(RecordingProvider::new());
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    let start = Instant::now();
    controller.set_query("bakery");

    sleep_until(start + Duration::from_millis(499)).await;
    settle_tasks().await;
    assert!(provider.calls().is_empty());
    assert_eq!(controller.state().phase, SearchPhase::Debouncing);

    // fires at exactly the window
    sleep_until(start + Duration::from_millis(500)).await;
    settle_tasks().await;
    assert_eq!(provider.calls(), vec!["bakery"]);
    assert_eq!(controller.state().phase, SearchPhase::Idle);

    sleep_until(start + Duration::from_millis(501)).await;
    settle_tasks().await;
    assert_eq!(provider.calls(), vec!["bakery"]);
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_restarts_window() {
    let provider = Arc::new(RecordingProvider::new());
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    controller.set_query("la");
    sleep(Duration::from_millis(400)).await;
    controller.set_query("law");
    sleep(Duration::from_millis(400)).await;
    settle_tasks().await;

    // 800ms after the first keystroke but only 400ms after the last
    assert!(provider.calls().is_empty());

    controller.settled().await;
    assert_eq!(provider.calls(), vec!["law"]);
}

#[tokio::test(start_paused = true)]
async fn test_pending_while_matching() {
    let provider =
        Arc::new(RecordingProvider::new().respond("cak", &["a"], Duration::from_millis(1000)));
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    controller.set_query("cak");
    assert!(!controller.is_pending());

    sleep(Duration::from_millis(600)).await;
    settle_tasks().await;

    let state = controller.state();
    assert_eq!(state.phase, SearchPhase::Matching);
    assert!(state.is_pending);
    assert_eq!(state.debounced_query, "cak");
    // previous results stay visible while the match runs
    assert_eq!(state.result_ids, vec!["a", "b"]);

    let state = controller.settled().await;
    assert!(!state.is_pending);
    assert_eq!(state.result_ids, vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_result_is_discarded() {
    let provider = Arc::new(
        RecordingProvider::new()
            .respond("slow", &["a"], Duration::from_millis(2000))
            .respond("fast", &["b"], Duration::from_millis(10)),
    );
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    controller.set_query("slow");
    sleep(Duration::from_millis(600)).await;
    settle_tasks().await;
    assert_eq!(controller.state().phase, SearchPhase::Matching);

    controller.set_query("fast");
    let state = controller.settled().await;
    assert_eq!(state.result_ids, vec!["b"]);

    // let the superseded call run to completion
    sleep(Duration::from_millis(3000)).await;
    settle_tasks().await;

    assert_eq!(provider.calls(), vec!["slow", "fast"]);
    assert_eq!(provider.completed(), vec!["fast", "slow"]);
    assert_eq!(controller.result_ids(), vec!["b"]);
    assert_eq!(controller.state().debounced_query, "fast");
}

#[tokio::test(start_paused = true)]
async fn test_abort_superseded_cancels_in_flight_match() {
    let provider = Arc::new(
        RecordingProvider::new()
            .respond("slow", &["a"], Duration::from_millis(2000))
            .respond("fast", &["b"], Duration::from_millis(10)),
    );
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(true));

    controller.set_query("slow");
    sleep(Duration::from_millis(600)).await;
    settle_tasks().await;

    controller.set_query("fast");
    controller.settled().await;

    sleep(Duration::from_millis(3000)).await;
    settle_tasks().await;

    assert_eq!(provider.calls(), vec!["slow", "fast"]);
    assert_eq!(provider.completed(), vec!["fast"]);
    assert_eq!(controller.result_ids(), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn test_candidate_change_supersedes_in_flight_match() {
    let provider =
        Arc::new(RecordingProvider::new().respond("pizza", &["c"], Duration::from_millis(2000)));
    let catalog = larger_catalog();
    let controller = SearchController::new(provider.clone(), catalog.clone(), options(false));

    controller.set_query("portfolio");
    sleep(Duration::from_millis(600)).await;
    controller.settled().await;

    controller.set_query("pizza");
    sleep(Duration::from_millis(600)).await;
    settle_tasks().await;
    assert!(controller.is_pending());

    let health = filter_by_category(&catalog, &CategorySelection::Only("health".to_string()));
    controller.set_candidates(health);
    assert!(!controller.is_pending());

    sleep(Duration::from_millis(3000)).await;
    settle_tasks().await;

    let state = controller.state();
    assert_eq!(state.phase, SearchPhase::Idle);
    assert_eq!(state.candidate_ids, vec!["d"]);
    assert!(state.result_ids.is_empty());
    // the second "pizza" cycle runs against the new candidates
    assert_eq!(provider.calls(), vec!["portfolio", "pizza", "pizza"]);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_phase_changes() {
    let provider =
        Arc::new(RecordingProvider::new().respond("cak", &["a"], Duration::from_millis(100)));
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));
    let mut rx = controller.subscribe();

    controller.set_query("cak");
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().phase, SearchPhase::Debouncing);

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().phase, SearchPhase::Matching);

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.phase, SearchPhase::Idle);
    assert_eq!(state.result_ids, vec!["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_cancels_match() {
    let provider =
        Arc::new(RecordingProvider::new().respond("cak", &["a"], Duration::from_millis(1000)));
    let controller = SearchController::new(provider.clone(), scenario_candidates(), options(false));

    controller.set_query("cak");
    sleep(Duration::from_millis(600)).await;
    settle_tasks().await;
    drop(controller);

    sleep(Duration::from_millis(2000)).await;
    settle_tasks().await;

    assert_eq!(provider.calls(), vec!["cak"]);
    assert!(provider.completed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_local_service_with_category_filter() {
    init_tracing();
    let config = SearchConfig::default();
    let service = Arc::new(SmartSearchService::new(config.clone()));
    let catalog = larger_catalog();

    let food = filter_by_category(&catalog, &CategorySelection::from_option(Some("food")));
    let controller = SearchController::from_config(service.clone(), food, &config);

    controller.set_query("cakes");
    let state = controller.settled().await;
    assert_eq!(state.result_ids, vec!["a", "c"]);

    let titles: Vec<String> = controller
        .visible_items()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Bakery Landing", "Pizzaria Napoli"]);

    controller.set_candidates(filter_by_category(
        &catalog,
        &CategorySelection::Only("services".to_string()),
    ));
    let state = controller.settled().await;
    assert_eq!(state.candidate_ids, vec!["b"]);
    assert!(state.result_ids.is_empty());
    assert!(controller.visible_items().is_empty());

    controller.set_candidates(filter_by_category(&catalog, &CategorySelection::All));
    controller.set_query("");
    let state = controller.settled().await;
    assert_eq!(state.result_ids, vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(service.stats().remote_hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_remote_service_hides_unknown_ids() {
    let matcher = ScriptedMatcher::returning(&["f", "ghost", "a"]);
    let calls = matcher.calls.clone();
    let service = Arc::new(SmartSearchService::with_matcher(
        config_with_key(),
        Box::new(matcher),
    ));
    let controller = SearchController::new(service.clone(), larger_catalog(), options(false));

    controller.set_query("festa de casamento");
    let state = controller.settled().await;

    assert_eq!(state.result_ids, vec!["f", "a"]);
    let visible: Vec<String> = controller.visible_items().into_iter().map(|c| c.id).collect();
    // visible items follow catalog order
    assert_eq!(visible, vec!["a", "f"]);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(service.stats().discarded_ids, 1);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_share_service_quota() {
    let mut config = config_with_key();
    config.rate_limit_per_minute = 1;
    config.cache_max_entries = 0;
    let matcher = ScriptedMatcher::returning(&["b"]);
    let calls = matcher.calls.clone();
    let service = Arc::new(SmartSearchService::with_matcher(config, Box::new(matcher)));

    let first = SearchController::new(service.clone(), scenario_candidates(), options(false));
    let second = SearchController::new(service.clone(), scenario_candidates(), options(false));

    first.set_query("cak");
    assert_eq!(first.settled().await.result_ids, vec!["b"]);

    // the first session spent the shared quota, so this one matches locally
    second.set_query("cak");
    assert_eq!(second.settled().await.result_ids, vec!["a"]);

    assert_eq!(calls.lock().unwrap().len(), 1);
    let stats = service.stats();
    assert_eq!(stats.remote_hits, 1);
    assert_eq!(stats.fallback_rate_limited, 1);
}
