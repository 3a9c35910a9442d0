use super::*;

fn loading(topic: Topic, retry_count: u32) -> EngineState {
    EngineState::Loading { topic, retry_count }
}

fn failed(topic: Topic, retry_count: u32) -> EngineState {
    EngineState::Failed { topic, retry_count, error: InsightError::Network("offline".into()) }
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn idle_has_no_topic_and_zero_retries() {
    let state = EngineState::default();
    assert_eq!(state, EngineState::Idle);
    assert_eq!(state.topic(), None);
    assert_eq!(state.retry_count(), 0);
    assert!(!state.can_retry());
    assert!(!state.is_loading());
}

#[test]
fn loaded_exposes_insight() {
    let insight = Insight { topic: Topic::Career, text: "Insight about career".into() };
    let state = EngineState::Loaded(insight.clone());
    assert_eq!(state.insight(), Some(&insight));
    assert_eq!(state.topic(), Some(Topic::Career));
    assert_eq!(state.retry_count(), 0);
    assert!(state.error().is_none());
}

#[test]
fn insight_equality_is_structural() {
    let a = Insight { topic: Topic::Love, text: "x".into() };
    let b = Insight { topic: Topic::Love, text: "x".into() };
    let c = Insight { topic: Topic::Mood, text: "x".into() };
    assert_eq!(a, b);
    assert_ne!(a, c);
}

// =============================================================================
// complete
// =============================================================================

#[test]
fn complete_success_loads_and_resets_retries() {
    let next = loading(Topic::Career, 2).complete(Ok("Insight about career".into())).unwrap();
    assert_eq!(next, EngineState::Loaded(Insight { topic: Topic::Career, text: "Insight about career".into() }));
    assert_eq!(next.retry_count(), 0);
}

#[test]
fn complete_trims_text() {
    let next = loading(Topic::Mood, 0).complete(Ok("  calm waters \n".into())).unwrap();
    assert_eq!(next.insight().map(|i| i.text.as_str()), Some("calm waters"));
}

#[test]
fn complete_empty_text_is_invalid_response() {
    let next = loading(Topic::Mood, 0).complete(Ok("   ".into())).unwrap();
    assert!(matches!(next.error(), Some(InsightError::InvalidResponse(_))));
    assert_eq!(next.retry_count(), 1);
}

#[test]
fn complete_failure_increments_retry_count() {
    for n in 0..MAX_RETRIES {
        let next = loading(Topic::Love, n).complete(Err(InsightError::Network("down".into()))).unwrap();
        assert_eq!(next.retry_count(), n + 1);
        assert_eq!(next.topic(), Some(Topic::Love));
    }
}

#[test]
fn complete_failure_never_exceeds_cap() {
    let next = loading(Topic::Love, MAX_RETRIES).complete(Err(InsightError::Network("down".into()))).unwrap();
    assert_eq!(next.retry_count(), MAX_RETRIES);
}

#[test]
fn complete_outside_loading_is_ignored() {
    assert!(EngineState::Idle.complete(Ok("x".into())).is_none());
    assert!(failed(Topic::Love, 1).complete(Ok("x".into())).is_none());
}

// =============================================================================
// can_retry / retry_plan
// =============================================================================

#[test]
fn can_retry_below_cap_only() {
    assert!(failed(Topic::Love, 1).can_retry());
    assert!(failed(Topic::Love, 2).can_retry());
    assert!(!failed(Topic::Love, 3).can_retry());
}

#[test]
fn retry_plan_dispatch_carries_count() {
    assert_eq!(
        failed(Topic::Finance, 2).retry_plan(),
        RetryPlan::Dispatch { topic: Topic::Finance, retry_count: 2 }
    );
}

#[test]
fn retry_plan_exhausted_at_cap() {
    let RetryPlan::Exhausted(state) = failed(Topic::Love, MAX_RETRIES).retry_plan() else {
        panic!("expected Exhausted");
    };
    assert_eq!(state.error(), Some(&InsightError::MaxRetriesReached { max: MAX_RETRIES }));
    assert_eq!(state.retry_count(), MAX_RETRIES);
    assert!(!state.can_retry());
}

#[test]
fn retry_plan_ignores_non_failed_states() {
    assert_eq!(EngineState::Idle.retry_plan(), RetryPlan::Ignore);
    assert_eq!(loading(Topic::Love, 1).retry_plan(), RetryPlan::Ignore);
    let loaded = EngineState::Loaded(Insight { topic: Topic::Love, text: "x".into() });
    assert_eq!(loaded.retry_plan(), RetryPlan::Ignore);
}

// =============================================================================
// InsightError
// =============================================================================

#[test]
fn error_codes_and_retryability() {
    let network = InsightError::Network("x".into());
    let invalid = InsightError::InvalidResponse("x".into());
    let capped = InsightError::MaxRetriesReached { max: 3 };
    assert_eq!(network.error_code(), "E_NETWORK");
    assert_eq!(invalid.error_code(), "E_INVALID_RESPONSE");
    assert_eq!(capped.error_code(), "E_MAX_RETRIES");
    assert!(network.retryable());
    assert!(invalid.retryable());
    assert!(!capped.retryable());
}

// =============================================================================
// view
// =============================================================================

#[test]
fn view_per_state() {
    assert_eq!(EngineState::Idle.view(), InsightView::Empty);
    assert_eq!(loading(Topic::Future, 0).view(), InsightView::Spinner { topic: Topic::Future });
    let loaded = EngineState::Loaded(Insight { topic: Topic::Future, text: "soon".into() });
    assert_eq!(loaded.view(), InsightView::Content { topic: Topic::Future, text: "soon".into() });
}

#[test]
fn view_error_shows_retry_below_cap() {
    let InsightView::Error { topic, report, show_retry } = failed(Topic::Love, 1).view() else {
        panic!("expected Error view");
    };
    assert_eq!(topic, Topic::Love);
    assert_eq!(report.code, "E_NETWORK");
    assert!(show_retry);
}

#[test]
fn view_error_hides_retry_at_cap() {
    let InsightView::Error { show_retry, .. } = failed(Topic::Love, MAX_RETRIES).view() else {
        panic!("expected Error view");
    };
    assert!(!show_retry);
}
