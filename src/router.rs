//! Path-to-view routing and history integration.
//!
//! [`resolve`] is the one route table. [`Router::navigate`] pushes a history
//! entry and re-derives the view; [`Router::on_popstate`] re-derives it after
//! the history moved on its own (back/forward) without pushing anything.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::View;
use crate::state::SharedState;

/// Map a navigation path to a view. Unknown paths fall back to the map.
pub fn resolve(path: &str) -> View {
    // Only the pathname takes part in routing
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    match path {
        "/" | "/map" | "" => View::Map,
        "/treaties" => View::Treaties,
        "/tribes" => View::Tribes,
        "/about" => View::About,
        _ => View::Map,
    }
}

/// The browser-history capability the router needs.
pub trait History: Send + Sync {
    fn current_path(&self) -> String;

    /// Push a new entry, discarding any forward entries.
    fn push(&self, path: &str);

    /// Move back one entry. Returns `false` at the start of history.
    fn back(&self) -> bool;

    /// Move forward one entry. Returns `false` at the end of history.
    fn forward(&self) -> bool;
}

/// In-memory history stack used when there is no browser.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<HistoryStack>,
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(HistoryStack {
                entries: vec![initial_path.into()],
                cursor: 0,
            }),
        }
    }

    /// Number of entries, including forward entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().entries.clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        let stack = self.inner.lock();
        stack.entries.get(stack.cursor).cloned().unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        let mut stack = self.inner.lock();
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(path.to_string());
        stack.cursor = stack.entries.len() - 1;
    }

    fn back(&self) -> bool {
        let mut stack = self.inner.lock();
        if stack.cursor == 0 {
            return false;
        }
        stack.cursor -= 1;
        true
    }

    fn forward(&self) -> bool {
        let mut stack = self.inner.lock();
        if stack.cursor + 1 >= stack.entries.len() {
            return false;
        }
        stack.cursor += 1;
        true
    }
}

pub struct Router {
    history: Arc<dyn History>,
    state: SharedState,
}

impl Router {
    pub fn new(history: Arc<dyn History>, state: SharedState) -> Self {
        Self { history, state }
    }

    /// View for the history's current path, used once before the first render.
    pub fn initial_view(history: &dyn History) -> View {
        resolve(&history.current_path())
    }

    pub fn current_path(&self) -> String {
        self.history.current_path()
    }

    /// Push `path` and switch to its view.
    pub fn navigate(&self, path: &str) -> View {
        self.history.push(path);
        self.sync_from_history()
    }

    /// Re-derive the view after the history moved without a push.
    pub fn on_popstate(&self) -> View {
        self.sync_from_history()
    }

    /// Browser back: move the history, then handle it as a popstate.
    pub fn back(&self) -> Option<View> {
        self.history.back().then(|| self.on_popstate())
    }

    pub fn forward(&self) -> Option<View> {
        self.history.forward().then(|| self.on_popstate())
    }

    fn sync_from_history(&self) -> View {
        let path = self.history.current_path();
        let view = resolve(&path);
        tracing::debug!(path = %path, ?view, "route");
        // Always notify: a route change re-renders even if the view is unchanged
        self.state.update(|s| s.current_view = view);
        view
    }
}
