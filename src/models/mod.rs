//! Domain models for the Windwalker client.
//!
//! # Core Concepts
//!
//! - [`Treaty`]: A treaty record as served by the data service. List rows carry a
//!   summary; the detail endpoint fills in articles, sources and citations.
//! - [`BoundaryFeature`]: One GeoJSON boundary polygon. Its year is not stored,
//!   it is derived from the feature name (see [`extract_year`]).
//! - [`SearchResult`]: A free-text search hit, usually a treaty or a tribe.
//! - [`View`]: The page currently shown, derived from the navigation path.
//!
//! The temporal range of the dataset is fixed: the first treaty was signed in
//! [`FIRST_TREATY_YEAR`] and Congress ended treaty-making in [`END_OF_TREATY_ERA`].

mod boundary;
mod search;
mod treaty;
mod view;

pub use boundary::*;
pub use search::*;
pub use treaty::*;
pub use view::*;

/// Earliest selectable cutoff year.
pub const FIRST_TREATY_YEAR: i32 = 1778;

/// Latest selectable cutoff year. At this cutoff undated boundaries become visible.
pub const END_OF_TREATY_ERA: i32 = 1871;

/// Clamp a year into `[FIRST_TREATY_YEAR, END_OF_TREATY_ERA]`.
pub fn clamp_year(year: i32) -> i32 {
    year.clamp(FIRST_TREATY_YEAR, END_OF_TREATY_ERA)
}

/// Service liveness report from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
