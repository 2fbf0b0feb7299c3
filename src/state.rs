//! The single client state container.
//!
//! [`AppState`] is created once at startup and owned by a [`SharedState`]
//! handle that every controller and the renderer hold a clone of. All
//! mutation goes through [`SharedState::update`] / [`SharedState::try_update`],
//! which run the whole change inside one critical section and then notify
//! subscribers with a snapshot. Nothing awaits while the lock is held.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{RequestKind, SyncFailure};
use crate::events::{CallbackRegistry, Subscription};
use crate::models::{
    DetailTab, SearchResult, Treaty, TreatyStatus, View, END_OF_TREATY_ERA,
};

/// Popup opened by clicking a boundary on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPopup {
    pub name: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current_view: View,
    /// Server-filtered snapshot, replaced wholesale on every list fetch.
    pub treaties: Vec<Treaty>,
    pub selected_treaty: Option<Treaty>,
    pub detail_panel_open: bool,
    pub detail_tab: DetailTab,
    /// `None` shows every status.
    pub status_filter: Option<TreatyStatus>,
    pub search_query: String,
    pub search_results: Vec<SearchResult>,
    pub year_cutoff: i32,
    pub playing: bool,
    /// True until the first list fetch resolves.
    pub loading: bool,
    pub boundaries_loaded: bool,
    pub visible_boundaries: usize,
    pub map_popup: Option<BoundaryPopup>,
    pub last_error: Option<SyncFailure>,
}

impl AppState {
    pub fn new(initial_view: View) -> Self {
        Self {
            current_view: initial_view,
            treaties: Vec::new(),
            selected_treaty: None,
            detail_panel_open: false,
            detail_tab: DetailTab::Overview,
            status_filter: None,
            search_query: String::new(),
            search_results: Vec::new(),
            year_cutoff: END_OF_TREATY_ERA,
            playing: false,
            loading: true,
            boundaries_loaded: false,
            visible_boundaries: 0,
            map_popup: None,
            last_error: None,
        }
    }

    /// Treaties of the current snapshot that pass the status filter.
    pub fn displayed_treaties(&self) -> Vec<&Treaty> {
        self.treaties
            .iter()
            .filter(|t| self.status_filter.map_or(true, |status| t.status == status))
            .collect()
    }

    /// Replace the snapshot, clearing a selection that is no longer part of it.
    ///
    /// Returns `true` if the selection had to be cleared.
    pub fn replace_treaties(&mut self, treaties: Vec<Treaty>) -> bool {
        self.treaties = treaties;
        self.loading = false;

        let orphaned = self
            .selected_treaty
            .as_ref()
            .is_some_and(|selected| !self.treaties.iter().any(|t| t.id == selected.id));
        if orphaned {
            self.clear_selection();
        }
        orphaned
    }

    /// Whether a treaty with `id` may be selected. Before the first snapshot
    /// arrives any id is accepted; `replace_treaties` checks it later.
    pub fn can_select(&self, id: &str) -> bool {
        self.loading || self.treaties.iter().any(|t| t.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected_treaty = None;
        self.detail_panel_open = false;
        self.detail_tab = DetailTab::Overview;
    }

    pub fn record_failure(&mut self, kind: RequestKind, message: impl Into<String>) {
        self.last_error = Some(SyncFailure {
            kind,
            message: message.into(),
        });
    }

    /// Clear `last_error` if it was left by an operation of `kind`.
    pub fn clear_failure(&mut self, kind: RequestKind) {
        if self.last_error.as_ref().is_some_and(|e| e.kind == kind) {
            self.last_error = None;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(View::Map)
    }
}

/// Cloneable handle to the one [`AppState`].
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<Mutex<AppState>>,
    listeners: Arc<CallbackRegistry<AppState>>,
}

impl SharedState {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
            listeners: CallbackRegistry::new(),
        }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.inner.lock().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&*self.inner.lock())
    }

    /// Apply a mutation and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = f(&mut *self.inner.lock());
        self.notify();
        result
    }

    /// Apply a mutation that may decide not to change anything.
    ///
    /// Subscribers are notified only when `f` returns `Some`.
    pub fn try_update<R>(&self, f: impl FnOnce(&mut AppState) -> Option<R>) -> Option<R> {
        let result = f(&mut *self.inner.lock());
        if result.is_some() {
            self.notify();
        }
        result
    }

    /// Register a callback invoked with a snapshot after every committed mutation.
    ///
    /// Callbacks run after the state lock is released but may run inside a
    /// playback tick, so they must not toggle or stop playback themselves.
    pub fn subscribe(&self, callback: impl Fn(&AppState) + Send + Sync + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.listeners.emit(&snapshot);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("state", &*self.inner.lock())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
