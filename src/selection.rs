//! Treaty selection and the detail panel.

use std::sync::Arc;

use crate::client::DataService;
use crate::error::{Outcome, RequestKind};
use crate::models::DetailTab;
use crate::sequence::RequestSequence;
use crate::state::SharedState;

pub struct SelectionController<D: DataService> {
    service: Arc<D>,
    state: SharedState,
    seq: RequestSequence,
}

impl<D: DataService> SelectionController<D> {
    pub fn new(service: Arc<D>, state: SharedState) -> Self {
        Self {
            service,
            state,
            seq: RequestSequence::new(RequestKind::TreatyDetail),
        }
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq.latest()
    }

    /// Fetch the full record for `id` and open it in the detail panel.
    ///
    /// Superseded by any later selection, by closing the panel, and by a
    /// view change while the request is in flight. A record that is not part
    /// of the loaded snapshot is dropped as stale. The status filter is not
    /// touched.
    pub async fn select_treaty(&self, id: &str) -> Outcome<String> {
        let (ticket, view) = self.state.read(|s| (self.seq.issue(), s.current_view));
        tracing::debug!(id, seq = ticket.seq(), "treaty detail issued");

        match self.service.get_treaty(id).await {
            Ok(treaty) => {
                let applied = self.state.try_update(|s| {
                    if !self.seq.is_current(ticket) || s.current_view != view {
                        return None;
                    }
                    if !s.can_select(&treaty.id) {
                        tracing::debug!(id = %treaty.id, year = s.year_cutoff, "treaty outside snapshot");
                        return None;
                    }
                    let id = treaty.id.clone();
                    s.selected_treaty = Some(treaty);
                    s.detail_panel_open = true;
                    s.detail_tab = DetailTab::Overview;
                    s.clear_failure(RequestKind::TreatyDetail);
                    Some(id)
                });
                match applied {
                    Some(id) => {
                        tracing::info!("Selected treaty {}", id);
                        Outcome::Applied(id)
                    }
                    None => {
                        tracing::debug!(id, seq = ticket.seq(), "dropping stale treaty detail");
                        Outcome::Stale
                    }
                }
            }
            Err(e) => {
                let current = self.state.try_update(|s| {
                    if !self.seq.is_current(ticket) || s.current_view != view {
                        return None;
                    }
                    s.record_failure(RequestKind::TreatyDetail, e.to_string());
                    Some(())
                });
                if current.is_some() {
                    tracing::error!("Failed to load treaty {}: {}", id, e);
                    Outcome::Failed(e)
                } else {
                    Outcome::Stale
                }
            }
        }
    }

    /// Close the panel and clear the selection. Any detail request still in
    /// flight becomes stale.
    pub fn close_detail_panel(&self) {
        self.state.update(|s| {
            self.seq.invalidate();
            s.clear_selection();
        });
    }

    /// Switch the detail panel tab. Returns `false` when nothing is selected.
    pub fn switch_tab(&self, tab: DetailTab) -> bool {
        self.state
            .try_update(|s| {
                s.selected_treaty.as_ref()?;
                s.detail_tab = tab;
                Some(())
            })
            .is_some()
    }
}
