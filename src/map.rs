//! Map-surface seam.
//!
//! The cartographic renderer is an external collaborator. The core only
//! needs to replace a named geometry source, add/remove styled layers,
//! listen for pointer events on a layer, and read/steer the camera.
//! [`HeadlessMap`] implements the seam in memory for the CLI and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use crate::events::{CallbackRegistry, Subscription};
use crate::models::{BoundaryFeature, FeatureCollection};
use crate::state::{BoundaryPopup, SharedState};

pub const BOUNDARY_SOURCE: &str = "treaty-boundaries";
pub const BOUNDARY_FILL_LAYER: &str = "treaty-boundaries-fill";
pub const BOUNDARY_OUTLINE_LAYER: &str = "treaty-boundaries-outline";

/// Geographic centre of the contiguous United States.
pub const DEFAULT_CENTER: LngLat = LngLat {
    lng: -98.5795,
    lat: 39.8283,
};
pub const DEFAULT_ZOOM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Fill,
    Line,
}

/// A styled layer drawing one source. Paint values may reference feature
/// properties with `["get", "<property>"]` expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: serde_json::Value,
}

/// Pointer notification delivered for a layer.
#[derive(Debug, Clone)]
pub enum PointerEvent {
    Click {
        feature: Arc<BoundaryFeature>,
        at: LngLat,
    },
    Enter,
    Leave,
}

pub type PointerHandler = Box<dyn Fn(&PointerEvent) + Send + Sync>;

/// Capabilities the core consumes from the map renderer.
pub trait MapSurface: Send + Sync {
    /// Add the source `id`, or replace its data if it exists.
    fn set_source(&self, id: &str, data: &FeatureCollection);

    fn add_layer(&self, layer: LayerSpec);

    fn remove_layer(&self, id: &str);

    fn has_layer(&self, id: &str) -> bool;

    fn set_cursor(&self, cursor: &str);

    fn camera(&self) -> Camera;

    fn fly_to(&self, center: LngLat, zoom: f64);

    fn fit_bounds(&self, bounds: Bounds, padding: f64);

    /// Listen for pointer events on `layer_id` until the subscription is dropped.
    fn on_pointer(&self, layer_id: &str, handler: PointerHandler) -> Subscription;
}

/// Fill and outline layers for the boundary source, coloured by the
/// feature's `color` property.
pub fn boundary_layers() -> [LayerSpec; 2] {
    [
        LayerSpec {
            id: BOUNDARY_FILL_LAYER.to_string(),
            kind: LayerKind::Fill,
            source: BOUNDARY_SOURCE.to_string(),
            paint: json!({
                "fill-color": ["get", "color"],
                "fill-opacity": 0.3
            }),
        },
        LayerSpec {
            id: BOUNDARY_OUTLINE_LAYER.to_string(),
            kind: LayerKind::Line,
            source: BOUNDARY_SOURCE.to_string(),
            paint: json!({
                "line-color": ["get", "color"],
                "line-width": 2,
                "line-opacity": 0.8
            }),
        },
    ]
}

/// Add the boundary source and layers, and wire click/hover on the fill layer.
///
/// A click opens a popup for the clicked boundary in the app state; hovering
/// switches to a pointer cursor. The returned subscriptions keep the wiring
/// alive.
pub fn install_boundary_layers(
    surface: &Arc<dyn MapSurface>,
    initial: &FeatureCollection,
    state: &SharedState,
) -> Vec<Subscription> {
    surface.set_source(BOUNDARY_SOURCE, initial);
    for layer in boundary_layers() {
        if !surface.has_layer(&layer.id) {
            surface.add_layer(layer);
        }
    }

    let state = state.clone();
    let weak_surface = Arc::downgrade(surface);
    let handler: PointerHandler = Box::new(move |event| match event {
        PointerEvent::Click { feature, .. } => {
            let popup = BoundaryPopup {
                name: feature.name().to_string(),
                link: feature.properties.description.clone(),
            };
            state.update(|s| s.map_popup = Some(popup));
        }
        PointerEvent::Enter => {
            if let Some(surface) = weak_surface.upgrade() {
                surface.set_cursor("pointer");
            }
        }
        PointerEvent::Leave => {
            if let Some(surface) = weak_surface.upgrade() {
                surface.set_cursor("");
            }
        }
    });

    vec![surface.on_pointer(BOUNDARY_FILL_LAYER, handler)]
}

/// In-memory map surface. Records what the core pushed and lets callers
/// simulate pointer events.
pub struct HeadlessMap {
    inner: Mutex<HeadlessInner>,
    handlers: Mutex<BTreeMap<String, Arc<CallbackRegistry<PointerEvent>>>>,
}

struct HeadlessInner {
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    cursor: String,
    camera: Camera,
    source_updates: usize,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HeadlessInner {
                sources: BTreeMap::new(),
                layers: Vec::new(),
                cursor: String::new(),
                camera: Camera {
                    center: DEFAULT_CENTER,
                    zoom: DEFAULT_ZOOM,
                    bounds: None,
                },
                source_updates: 0,
            }),
            handlers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Current data of source `id`.
    pub fn source(&self, id: &str) -> Option<FeatureCollection> {
        self.inner.lock().sources.get(id).cloned()
    }

    /// How many times any source has been set.
    pub fn source_updates(&self) -> usize {
        self.inner.lock().source_updates
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.inner.lock().layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn cursor(&self) -> String {
        self.inner.lock().cursor.clone()
    }

    /// Deliver a pointer event to the handlers of `layer_id`.
    pub fn emit(&self, layer_id: &str, event: PointerEvent) {
        let registry = self.handlers.lock().get(layer_id).cloned();
        if let Some(registry) = registry {
            registry.emit(&event);
        }
    }

    pub fn listener_count(&self, layer_id: &str) -> usize {
        self.handlers
            .lock()
            .get(layer_id)
            .map_or(0, |registry| registry.len())
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for HeadlessMap {
    fn set_source(&self, id: &str, data: &FeatureCollection) {
        let mut inner = self.inner.lock();
        inner.sources.insert(id.to_string(), data.clone());
        inner.source_updates += 1;
    }

    fn add_layer(&self, layer: LayerSpec) {
        let mut inner = self.inner.lock();
        inner.layers.retain(|l| l.id != layer.id);
        inner.layers.push(layer);
    }

    fn remove_layer(&self, id: &str) {
        self.inner.lock().layers.retain(|l| l.id != id);
    }

    fn has_layer(&self, id: &str) -> bool {
        self.inner.lock().layers.iter().any(|l| l.id == id)
    }

    fn set_cursor(&self, cursor: &str) {
        self.inner.lock().cursor = cursor.to_string();
    }

    fn camera(&self) -> Camera {
        self.inner.lock().camera
    }

    fn fly_to(&self, center: LngLat, zoom: f64) {
        let mut inner = self.inner.lock();
        inner.camera.center = center;
        inner.camera.zoom = zoom;
        inner.camera.bounds = None;
    }

    fn fit_bounds(&self, bounds: Bounds, _padding: f64) {
        let mut inner = self.inner.lock();
        inner.camera.center = LngLat {
            lng: (bounds.south_west.lng + bounds.north_east.lng) / 2.0,
            lat: (bounds.south_west.lat + bounds.north_east.lat) / 2.0,
        };
        inner.camera.bounds = Some(bounds);
    }

    fn on_pointer(&self, layer_id: &str, handler: PointerHandler) -> Subscription {
        let registry = Arc::clone(
            self.handlers
                .lock()
                .entry(layer_id.to_string())
                .or_insert_with(CallbackRegistry::new),
        );
        registry.subscribe(move |event| handler(event))
    }
}
