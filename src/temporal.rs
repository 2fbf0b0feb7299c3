//! Temporal cutoff control: slider, step/reset, and timed playback.
//!
//! Every cutoff change commits, in one state update, the clamped year, a new
//! treaty-list ticket, and the boundary layer filtered for that same year.
//! The server-side list is then fetched and committed only if its ticket is
//! still the latest, so a slow response for an older cutoff can never
//! overwrite a newer one.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundaries::BoundaryLayerSync;
use crate::client::DataService;
use crate::config::ClientConfig;
use crate::error::{Outcome, RequestKind};
use crate::map::{MapSurface, BOUNDARY_SOURCE};
use crate::models::{clamp_year, END_OF_TREATY_ERA};
use crate::playback::{PlaybackHandle, PlaybackTimer, TickControl};
use crate::sequence::{RequestSequence, Ticket};
use crate::state::{AppState, SharedState};

pub struct TemporalController<D: DataService> {
    service: Arc<D>,
    state: SharedState,
    boundaries: Arc<BoundaryLayerSync>,
    surface: Arc<dyn MapSurface>,
    list_seq: RequestSequence,
    timer: PlaybackTimer,
    playback: Mutex<Option<PlaybackHandle>>,
}

impl<D: DataService> TemporalController<D> {
    pub fn new(
        service: Arc<D>,
        state: SharedState,
        boundaries: Arc<BoundaryLayerSync>,
        surface: Arc<dyn MapSurface>,
        config: &ClientConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            state,
            boundaries,
            surface,
            list_seq: RequestSequence::new(RequestKind::TreatyList),
            timer: PlaybackTimer::new(config.playback_period()),
            playback: Mutex::new(None),
        })
    }

    pub fn year(&self) -> i32 {
        self.state.read(|s| s.year_cutoff)
    }

    pub fn is_playing(&self) -> bool {
        self.state.read(|s| s.playing)
    }

    /// Latest list ticket number issued.
    pub fn latest_list_seq(&self) -> u64 {
        self.list_seq.latest()
    }

    /// Fetch the unscoped treaty list shown at startup.
    pub async fn load_initial(&self) -> Outcome<usize> {
        let ticket = self.state.read(|_| self.list_seq.issue());
        self.fetch_list(ticket, None).await
    }

    /// Move the cutoff to `year` (clamped) and refetch the list for it.
    pub async fn set_year(&self, year: i32) -> Outcome<usize> {
        let (year, ticket) = self.state.update(|s| self.commit(s, year));
        self.fetch_list(ticket, Some(year)).await
    }

    /// Move the cutoff by `delta` years, clamped to the dataset range.
    pub async fn step(&self, delta: i32) -> Outcome<usize> {
        let (year, ticket) = self.state.update(|s| {
            let target = s.year_cutoff.saturating_add(delta);
            self.commit(s, target)
        });
        self.fetch_list(ticket, Some(year)).await
    }

    /// Stop playback if it is running, then return to the end of the treaty era.
    pub async fn reset(&self) -> Outcome<usize> {
        self.stop_playback();
        self.set_year(END_OF_TREATY_ERA).await
    }

    /// Start playback if stopped, stop it if playing. Returns the new playing flag.
    ///
    /// The playback slot is never held while state listeners run.
    pub fn toggle_play(self: &Arc<Self>) -> bool {
        let playing = self.state.update(|s| {
            s.playing = !s.playing;
            s.playing
        });

        // Also drops a timer that ended itself at the last year
        let previous = self.playback.lock().take();
        if let Some(handle) = previous {
            handle.stop();
        }

        if !playing {
            tracing::info!("Playback paused at {}", self.year());
            return false;
        }

        let controller = Arc::downgrade(self);
        let handle = self.timer.start(move || match controller.upgrade() {
            Some(controller) => controller.on_tick(),
            None => TickControl::Stop,
        });
        let displaced = self.playback.lock().replace(handle);
        if let Some(displaced) = displaced {
            displaced.stop();
        }
        tracing::info!("Playback started at {}", self.year());
        true
    }

    /// Stop playback. Idempotent; returns `true` if playback was running.
    pub fn stop_playback(&self) -> bool {
        let previous = self.playback.lock().take();
        if let Some(handle) = previous {
            handle.stop();
        }

        self.state
            .try_update(|s| {
                if !s.playing {
                    return None;
                }
                s.playing = false;
                Some(())
            })
            .is_some()
    }

    /// Re-push the boundary layer for the committed cutoff. Returns the visible count.
    pub fn sync_boundaries(&self) -> usize {
        self.state.update(|s| self.push_boundaries(s))
    }

    fn on_tick(self: &Arc<Self>) -> TickControl {
        let committed = self.state.try_update(|s| {
            if !s.playing {
                return None;
            }
            if s.year_cutoff >= END_OF_TREATY_ERA {
                s.playing = false;
                return Some(None);
            }
            let next = s.year_cutoff + 1;
            let (year, ticket) = self.commit(s, next);
            if year >= END_OF_TREATY_ERA {
                s.playing = false;
            }
            Some(Some((year, ticket, s.playing)))
        });

        let Some(next) = committed else {
            return TickControl::Stop;
        };
        let Some((year, ticket, still_playing)) = next else {
            tracing::info!("Playback reached {}", END_OF_TREATY_ERA);
            return TickControl::Stop;
        };

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.fetch_list(ticket, Some(year)).await;
        });

        if still_playing {
            TickControl::Continue
        } else {
            tracing::info!("Playback reached {}", END_OF_TREATY_ERA);
            TickControl::Stop
        }
    }

    fn commit(&self, s: &mut AppState, year: i32) -> (i32, Ticket) {
        let year = clamp_year(year);
        s.year_cutoff = year;
        let ticket = self.list_seq.issue();
        self.push_boundaries(s);
        tracing::debug!(year, seq = ticket.seq(), "cutoff committed");
        (year, ticket)
    }

    fn push_boundaries(&self, s: &mut AppState) -> usize {
        if !self.boundaries.is_loaded() {
            return 0;
        }
        let filtered = self.boundaries.filter_by_year(s.year_cutoff);
        self.surface.set_source(BOUNDARY_SOURCE, &filtered);
        s.boundaries_loaded = true;
        s.visible_boundaries = filtered.len();
        filtered.len()
    }

    async fn fetch_list(&self, ticket: Ticket, year_end: Option<i32>) -> Outcome<usize> {
        match self.service.list_treaties(year_end).await {
            Ok(list) => {
                let applied = self.state.try_update(|s| {
                    if !self.list_seq.is_current(ticket) {
                        return None;
                    }
                    let count = list.treaties.len();
                    if s.replace_treaties(list.treaties) {
                        tracing::info!("Selected treaty is not in the new snapshot; cleared");
                    }
                    s.clear_failure(RequestKind::TreatyList);
                    Some(count)
                });
                match applied {
                    Some(count) => {
                        tracing::debug!(?year_end, count, "treaty list applied");
                        Outcome::Applied(count)
                    }
                    None => {
                        tracing::debug!(?year_end, seq = ticket.seq(), "dropping stale treaty list");
                        Outcome::Stale
                    }
                }
            }
            Err(e) => {
                let current = self.state.try_update(|s| {
                    if !self.list_seq.is_current(ticket) {
                        return None;
                    }
                    s.record_failure(RequestKind::TreatyList, e.to_string());
                    Some(())
                });
                if current.is_some() {
                    tracing::error!("Failed to fetch treaties: {}", e);
                    Outcome::Failed(e)
                } else {
                    Outcome::Stale
                }
            }
        }
    }
}
