//! Composition root.
//!
//! [`Windwalker`] owns the one [`SharedState`] and wires the router, the
//! controllers, the boundary cache and the map surface around it. It is
//! built once at startup and torn down with [`Windwalker::shutdown`] (or by
//! dropping it), which stops playback, cancels a pending search and
//! unwires the map handlers.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundaries::BoundaryLayerSync;
use crate::client::DataService;
use crate::config::ClientConfig;
use crate::error::{ClientError, Outcome, RequestKind};
use crate::events::Subscription;
use crate::map::{install_boundary_layers, MapSurface};
use crate::models::{EntityType, SearchResult, TreatyStatus, View};
use crate::render;
use crate::router::{History, Router};
use crate::search::SearchController;
use crate::selection::SelectionController;
use crate::state::{AppState, SharedState};
use crate::temporal::TemporalController;

pub struct Windwalker<D: DataService> {
    config: ClientConfig,
    service: Arc<D>,
    state: SharedState,
    router: Router,
    boundaries: Arc<BoundaryLayerSync>,
    surface: Arc<dyn MapSurface>,
    temporal: Arc<TemporalController<D>>,
    search: Arc<SearchController<D>>,
    selection: SelectionController<D>,
    map_wiring: Mutex<Vec<Subscription>>,
}

impl<D: DataService> Windwalker<D> {
    /// Build the engine. The initial view is derived from the history's
    /// current path before anything is rendered.
    pub fn new(
        service: D,
        history: Arc<dyn History>,
        surface: Arc<dyn MapSurface>,
        config: ClientConfig,
    ) -> Self {
        let initial_view = Router::initial_view(history.as_ref());
        let state = SharedState::new(AppState::new(initial_view));
        let service = Arc::new(service);
        let boundaries = Arc::new(BoundaryLayerSync::new());

        let temporal = TemporalController::new(
            Arc::clone(&service),
            state.clone(),
            Arc::clone(&boundaries),
            Arc::clone(&surface),
            &config,
        );
        let search = SearchController::new(Arc::clone(&service), state.clone(), &config);
        let selection = SelectionController::new(Arc::clone(&service), state.clone());
        let router = Router::new(history, state.clone());

        tracing::debug!(view = ?initial_view, "engine created");
        Self {
            config,
            service,
            state,
            router,
            boundaries,
            surface,
            temporal,
            search,
            selection,
            map_wiring: Mutex::new(Vec::new()),
        }
    }

    /// Load the initial treaty list and the boundary layer concurrently.
    ///
    /// A boundary failure is logged and recorded; the list outcome is returned.
    pub async fn start(&self) -> Outcome<usize> {
        let (list, boundaries) = tokio::join!(self.temporal.load_initial(), self.load_boundaries());
        if let Err(e) = boundaries {
            tracing::warn!("Treaty boundaries unavailable: {}", e);
        }
        list
    }

    /// Fetch (once) and install the boundary layer, filtered for the
    /// committed cutoff. Returns the number of visible boundaries.
    pub async fn load_boundaries(&self) -> Result<usize, ClientError> {
        let source = match self.boundaries.load(self.service.as_ref()).await {
            Ok(source) => source,
            Err(e) => {
                self.state
                    .update(|s| s.record_failure(RequestKind::Boundaries, e.to_string()));
                return Err(e);
            }
        };

        {
            let mut wiring = self.map_wiring.lock();
            if wiring.is_empty() {
                *wiring = install_boundary_layers(&self.surface, &source, &self.state);
            }
        }

        let visible = self.temporal.sync_boundaries();
        self.state.update(|s| s.clear_failure(RequestKind::Boundaries));
        Ok(visible)
    }

    pub fn navigate(&self, path: &str) -> View {
        self.router.navigate(path)
    }

    /// Browser back. `None` at the start of history.
    pub fn back(&self) -> Option<View> {
        self.router.back()
    }

    pub fn forward(&self) -> Option<View> {
        self.router.forward()
    }

    /// Change the status filter. Returns how many treaties are displayed.
    pub fn set_status_filter(&self, status: Option<TreatyStatus>) -> usize {
        self.state.update(|s| {
            s.status_filter = status;
            s.displayed_treaties().len()
        })
    }

    pub async fn select_treaty(&self, id: &str) -> Outcome<String> {
        self.selection.select_treaty(id).await
    }

    /// Follow a search hit. Treaty hits open the detail panel; every hit
    /// clears the search box. Returns the selection outcome for treaty hits.
    pub async fn select_search_result(&self, result: &SearchResult) -> Option<Outcome<String>> {
        self.search.clear();
        match result.entity_type {
            EntityType::Treaty => Some(self.selection.select_treaty(&result.id).await),
            EntityType::Tribe | EntityType::Other => None,
        }
    }

    /// Open a treaty from the treaties grid: switch to the map, then select it.
    pub async fn open_treaty_card(&self, id: &str) -> Outcome<String> {
        self.router.navigate(View::Map.path());
        self.selection.select_treaty(id).await
    }

    pub fn close_detail_panel(&self) {
        self.selection.close_detail_panel();
    }

    pub fn dismiss_popup(&self) {
        self.state.update(|s| s.map_popup = None);
    }

    /// Render the current state.
    pub fn render(&self) -> String {
        self.state.read(render::render)
    }

    /// Re-render after every committed state change until the subscription is dropped.
    pub fn attach_renderer(&self, draw: impl Fn(String) + Send + Sync + 'static) -> Subscription {
        self.state.subscribe(move |state| draw(render::render(state)))
    }

    /// Stop playback, cancel a pending search and unwire the map.
    pub fn shutdown(&self) {
        self.temporal.stop_playback();
        self.search.cancel_pending();
        let wiring = std::mem::take(&mut *self.map_wiring.lock());
        drop(wiring);
        tracing::debug!("engine shut down");
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn service(&self) -> &D {
        &self.service
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn boundaries(&self) -> &BoundaryLayerSync {
        &self.boundaries
    }

    pub fn temporal(&self) -> &Arc<TemporalController<D>> {
        &self.temporal
    }

    pub fn search(&self) -> &Arc<SearchController<D>> {
        &self.search
    }

    pub fn selection(&self) -> &SelectionController<D> {
        &self.selection
    }
}

impl<D: DataService> Drop for Windwalker<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
