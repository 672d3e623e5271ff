use crate::coordinator::{SearchCoordinator, SearchError};
use encart_shared::models::events::{SearchEvent, SearchOutcome};
use encart_shared::Clock;
use encart_store::caches::normalize_query;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Default)]
struct DebounceState {
    last_query: Option<String>,
    pending: Option<JoinHandle<()>>,
}

/// Collapses bursts of query changes into one search per quiet period.
///
/// Only the timer is cancellable. Once the delay has elapsed the search runs
/// on its own task, so a newer keystroke never cancels a dispatched lookup.
pub struct SearchDebouncer {
    coordinator: Arc<SearchCoordinator>,
    delay: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<DebounceState>,
    events: broadcast::Sender<SearchEvent>,
}

impl SearchDebouncer {
    pub fn new(coordinator: Arc<SearchCoordinator>, delay: Duration, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            coordinator,
            delay,
            clock,
            state: Mutex::new(DebounceState::default()),
            events,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Outcomes of debounced searches, in firing order.
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    /// Feed the latest query text. Returns `false` when the text is unchanged
    /// from the previous call and was ignored.
    pub fn handle(&self, query: &str) -> bool {
        let normalized = normalize_query(query);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.last_query.as_deref() == Some(normalized.as_str()) {
            debug!("Query '{}' unchanged, ignoring", normalized);
            return false;
        }
        state.last_query = Some(normalized.clone());

        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        // Clearing the input only cancels.
        if normalized.is_empty() {
            return true;
        }

        let coordinator = self.coordinator.clone();
        let clock = self.clock.clone();
        let events = self.events.clone();
        let delay = self.delay;

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(async move {
                info!("Debounced search firing for '{}'", normalized);
                let outcome = match coordinator.search(&normalized).await {
                    Ok(Some(records)) => SearchOutcome::Completed { count: records.len() },
                    Ok(None) => SearchOutcome::Pending,
                    Err(SearchError::Validation(e)) | Err(SearchError::Collaborator(e)) => {
                        SearchOutcome::Failed { error: e }
                    }
                };
                // No subscribers is fine.
                let _ = events.send(SearchEvent {
                    query: normalized,
                    outcome,
                    fired_at: clock.now(),
                });
            });
        }));
        true
    }

    /// Drop any scheduled search that has not fired yet and forget the last
    /// query, so the same text can be submitted again.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.last_query = None;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
