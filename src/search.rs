//! Debounced full-text search.
//!
//! Each keystroke restarts a quiet-period timer; only when it elapses is a
//! request issued, with a fresh ticket. A response is applied only if its
//! ticket is still the latest and the user has not changed view since.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::client::DataService;
use crate::config::ClientConfig;
use crate::error::{Outcome, RequestKind};
use crate::sequence::RequestSequence;
use crate::state::SharedState;

pub struct SearchController<D: DataService> {
    service: Arc<D>,
    state: SharedState,
    seq: RequestSequence,
    debounce: Duration,
    min_query_len: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<D: DataService> SearchController<D> {
    pub fn new(service: Arc<D>, state: SharedState, config: &ClientConfig) -> Arc<Self> {
        Arc::new(Self {
            service,
            state,
            seq: RequestSequence::new(RequestKind::Search),
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            pending: Mutex::new(None),
        })
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Latest search ticket number issued.
    pub fn latest_seq(&self) -> u64 {
        self.seq.latest()
    }

    /// Record new input text and (re)start the debounce window.
    ///
    /// Text shorter than the minimum length clears the results at once and
    /// makes any in-flight search stale.
    pub fn on_query_changed(self: &Arc<Self>, text: &str) {
        let previous = self.pending.lock().take();
        if let Some(task) = previous {
            task.abort();
        }

        let query = text.to_string();
        let too_short = self.is_too_short(&query);
        self.state.update(|s| {
            s.search_query = query.clone();
            if too_short {
                self.seq.invalidate();
                s.search_results.clear();
            }
        });
        if too_short {
            return;
        }

        let controller = Arc::clone(self);
        let debounce = self.debounce;
        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Detached so a later keystroke cancels only the wait, never an issued request
            tokio::spawn(async move {
                controller.search_now(&query).await;
            });
        });
        let displaced = self.pending.lock().replace(task);
        if let Some(displaced) = displaced {
            displaced.abort();
        }
    }

    /// Issue a search immediately, bypassing the debounce window.
    pub async fn search_now(&self, query: &str) -> Outcome<usize> {
        if self.is_too_short(query) {
            self.state.update(|s| {
                self.seq.invalidate();
                s.search_results.clear();
            });
            return Outcome::Applied(0);
        }

        let (ticket, view) = self.state.read(|s| (self.seq.issue(), s.current_view));
        tracing::debug!(query, seq = ticket.seq(), "search issued");

        match self.service.search(query).await {
            Ok(response) => {
                let applied = self.state.try_update(|s| {
                    if !self.seq.is_current(ticket) || s.current_view != view {
                        return None;
                    }
                    let count = response.results.len();
                    s.search_results = response.results;
                    s.clear_failure(RequestKind::Search);
                    Some(count)
                });
                match applied {
                    Some(count) => Outcome::Applied(count),
                    None => {
                        tracing::debug!(query, seq = ticket.seq(), "dropping stale search results");
                        Outcome::Stale
                    }
                }
            }
            Err(e) => {
                let current = self.state.try_update(|s| {
                    if !self.seq.is_current(ticket) || s.current_view != view {
                        return None;
                    }
                    s.record_failure(RequestKind::Search, e.to_string());
                    Some(())
                });
                if current.is_some() {
                    tracing::error!("Search failed: {}", e);
                    Outcome::Failed(e)
                } else {
                    Outcome::Stale
                }
            }
        }
    }

    /// Cancel the pending debounce timer, if any.
    pub fn cancel_pending(&self) -> bool {
        match self.pending.lock().take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Empty the query and the results, discarding anything in flight.
    pub fn clear(&self) {
        self.cancel_pending();
        self.state.update(|s| {
            self.seq.invalidate();
            s.search_query.clear();
            s.search_results.clear();
        });
    }

    fn is_too_short(&self, query: &str) -> bool {
        query.chars().count() < self.min_query_len
    }
}
