//! Windwalker client engine.
//!
//! Keeps a server-filtered treaty list, a client-filtered boundary layer,
//! the search box and the detail panel consistent with one temporal cutoff
//! and one current view. Responses that arrive after a newer request of the
//! same kind are dropped, and playback can always be stopped cleanly.
//!
//! Start from [`app::Windwalker`].

pub mod app;
pub mod boundaries;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod map;
pub mod models;
pub mod playback;
pub mod render;
pub mod router;
pub mod search;
pub mod selection;
pub mod sequence;
pub mod state;
pub mod temporal;

pub use app::Windwalker;
pub use client::{DataService, HttpDataService};
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError, Outcome, RequestKind};
pub use map::{HeadlessMap, MapSurface};
pub use router::{History, MemoryHistory};
pub use state::{AppState, SharedState};
