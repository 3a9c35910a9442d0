//! Insight engine: owns the state machine and the one in-flight request.
//!
//! DESIGN
//! ======
//! State lives behind a short-lived `std::sync::Mutex`; no lock is held
//! across the collaborator call, which is the only suspension point. Every
//! dispatch bumps a generation counter and the spawned task captures it;
//! on completion the outcome is applied only if the generation is still
//! current. Selecting a new topic or clearing therefore supersedes any
//! request already in flight without cancelling it.
//!
//! Every state change is published on a `watch` channel so a view can
//! render from `subscribe()` instead of polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::generator::{InsightGenerator, InsightRequest};
use super::state::{EngineState, InsightError, InsightView, RetryPlan};
use crate::deck::Card;
use crate::topic::Topic;

struct Inner {
    state: EngineState,
    /// Incremented on every dispatch and clear; stale completions compare against it.
    generation: u64,
}

/// Per-screen insight state machine.
#[derive(Clone)]
pub struct InsightEngine {
    generator: Arc<dyn InsightGenerator>,
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<EngineState>>,
}

impl InsightEngine {
    #[must_use]
    pub fn new(generator: Arc<dyn InsightGenerator>) -> Self {
        let (updates, _) = watch::channel(EngineState::Idle);
        Self {
            generator,
            inner: Arc::new(Mutex::new(Inner { state: EngineState::Idle, generation: 0 })),
            updates: Arc::new(updates),
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        lock(&self.inner).state.clone()
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        lock(&self.inner).state.can_retry()
    }

    #[must_use]
    pub fn view(&self) -> InsightView {
        lock(&self.inner).state.view()
    }

    /// Receiver that observes every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.updates.subscribe()
    }

    /// Start a reading for `topic`, superseding anything in flight.
    ///
    /// The state is `Loading` when this returns. Returns the handle of the
    /// spawned request, or `None` when `cards` is empty. Must be called
    /// inside a Tokio runtime.
    pub fn select_topic(&self, topic: Topic, cards: &[Card]) -> Option<JoinHandle<()>> {
        if cards.is_empty() {
            warn!(%topic, "insight: topic selected without cards; ignoring");
            return None;
        }
        let mut inner = lock(&self.inner);
        info!(%topic, cards = cards.len(), "insight: topic selected");
        Some(self.dispatch(&mut inner, topic, 0, cards))
    }

    /// Re-issue the failed request, keeping its failure count.
    ///
    /// Returns `None` without calling the collaborator when the state is not
    /// `Failed`, when the retry cap is reached (the state then carries
    /// `MaxRetriesReached`), or when `cards` is empty.
    pub fn retry(&self, cards: &[Card]) -> Option<JoinHandle<()>> {
        let mut inner = lock(&self.inner);
        match inner.state.retry_plan() {
            RetryPlan::Ignore => {
                debug!("insight: retry ignored outside failed state");
                None
            }
            RetryPlan::Exhausted(terminal) => {
                warn!(topic = ?terminal.topic(), retry_count = terminal.retry_count(), "insight: max retries reached");
                inner.state = terminal;
                self.publish(&inner);
                None
            }
            RetryPlan::Dispatch { topic, retry_count } => {
                if cards.is_empty() {
                    warn!(%topic, "insight: retry without cards; ignoring");
                    return None;
                }
                info!(%topic, retry_count, "insight: retrying");
                Some(self.dispatch(&mut inner, topic, retry_count, cards))
            }
        }
    }

    /// Return to `Idle` and drop any in-flight result.
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        inner.state = EngineState::Idle;
        self.publish(&inner);
        debug!("insight: cleared");
    }

    /// Read `topic` until it settles, retrying failures up to the cap.
    ///
    /// Resolves to `Loaded`, or to `Failed` carrying `MaxRetriesReached`
    /// once every retry is spent. With no cards nothing is dispatched and
    /// the current state is returned.
    ///
    /// # Errors
    ///
    /// Returns the join error if a request task panicked.
    pub async fn run_with_retries(&self, topic: Topic, cards: &[Card]) -> Result<EngineState, JoinError> {
        let Some(first) = self.select_topic(topic, cards) else {
            return Ok(self.state());
        };
        first.await?;
        // At the cap `retry` records the terminal error and returns `None`.
        while let Some(handle) = self.retry(cards) {
            handle.await?;
        }
        Ok(self.state())
    }

    fn dispatch(&self, inner: &mut Inner, topic: Topic, retry_count: u32, cards: &[Card]) -> JoinHandle<()> {
        inner.generation += 1;
        let generation = inner.generation;
        inner.state = EngineState::Loading { topic, retry_count };
        self.publish(inner);

        let request = InsightRequest::for_topic(topic, cards);
        let generator = Arc::clone(&self.generator);
        let shared = Arc::clone(&self.inner);
        let updates = Arc::clone(&self.updates);

        tokio::spawn(async move {
            let outcome = generator.generate(&request).await;
            apply_outcome(&shared, &updates, generation, outcome);
        })
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.state.clone());
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_outcome(
    shared: &Mutex<Inner>,
    updates: &watch::Sender<EngineState>,
    generation: u64,
    outcome: Result<String, InsightError>,
) {
    let mut inner = lock(shared);
    if inner.generation != generation {
        debug!(generation, current = inner.generation, "insight: discarding stale response");
        return;
    }
    let Some(next) = inner.state.complete(outcome) else {
        return;
    };
    match &next {
        EngineState::Loaded(insight) => info!(topic = %insight.topic, len = insight.text.len(), "insight: loaded"),
        EngineState::Failed { topic, retry_count, error } => {
            warn!(%topic, retry_count, error = %error, can_retry = next.can_retry(), "insight: request failed");
        }
        EngineState::Idle | EngineState::Loading { .. } => {}
    }
    inner.state = next;
    updates.send_replace(inner.state.clone());
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
