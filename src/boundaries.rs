//! Client-side cache and temporal filter for the boundary layer.
//!
//! The full boundary collection is fetched once and kept for the life of the
//! client. Only the filtered view changes as the cutoff moves, and that view
//! is a pure function of the cached collection and the cutoff year.

use std::sync::{Arc, OnceLock};

use crate::client::DataService;
use crate::error::ClientError;
use crate::models::{FeatureCollection, END_OF_TREATY_ERA};

/// Filter a collection to the features visible at `max_year`.
///
/// At or beyond the end of the treaty era every feature is shown, undated
/// ones included. Below it only dated features signed in or before
/// `max_year` are kept.
pub fn filter_features(collection: &FeatureCollection, max_year: i32) -> FeatureCollection {
    if max_year >= END_OF_TREATY_ERA {
        return collection.clone();
    }
    let features = collection
        .features
        .iter()
        .filter(|feature| feature.year().is_some_and(|year| year <= max_year))
        .cloned()
        .collect();
    FeatureCollection::new(features)
}

#[derive(Debug, Default)]
pub struct BoundaryLayerSync {
    source: OnceLock<Arc<FeatureCollection>>,
}

impl BoundaryLayerSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.source.get().is_some()
    }

    /// The cached collection, if it has been loaded.
    pub fn source(&self) -> Option<Arc<FeatureCollection>> {
        self.source.get().cloned()
    }

    /// Cache `collection` unless one is cached already. Returns the cached one.
    pub fn install(&self, collection: FeatureCollection) -> Arc<FeatureCollection> {
        Arc::clone(self.source.get_or_init(|| Arc::new(collection)))
    }

    /// Fetch the collection from the service the first time; afterwards return the cache.
    pub async fn load<D: DataService>(
        &self,
        service: &D,
    ) -> Result<Arc<FeatureCollection>, ClientError> {
        if let Some(cached) = self.source() {
            return Ok(cached);
        }
        let collection = service.boundaries().await?;
        tracing::info!("Loaded {} treaty boundaries", collection.len());
        Ok(self.install(collection))
    }

    /// Features visible at `max_year`. Empty until the collection is loaded.
    pub fn filter_by_year(&self, max_year: i32) -> FeatureCollection {
        match self.source.get() {
            Some(source) => filter_features(source, max_year),
            None => FeatureCollection::empty(),
        }
    }
}
