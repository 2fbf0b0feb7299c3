//! Treaties grid, tribal nations tally and the about page.

use std::collections::HashMap;

use crate::state::AppState;

use super::plural;
use super::sidebar::{signed_label, tribe_summary};

const CARD_TRIBES: usize = 2;

/// A tribal nation and the number of loaded treaties naming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TribeTally {
    pub name: String,
    pub treaties: usize,
}

/// Count treaties per tribe name across the snapshot, most treaties first,
/// ties broken by name.
pub fn tally_tribes(state: &AppState) -> Vec<TribeTally> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for treaty in &state.treaties {
        for tribe in &treaty.tribes {
            *counts.entry(tribe.name.as_str()).or_default() += 1;
        }
    }

    let mut tally: Vec<TribeTally> = counts
        .into_iter()
        .map(|(name, treaties)| TribeTally {
            name: name.to_string(),
            treaties,
        })
        .collect();
    tally.sort_by(|a, b| b.treaties.cmp(&a.treaties).then_with(|| a.name.cmp(&b.name)));
    tally
}

pub fn render_treaty_grid(output: &mut String, state: &AppState) {
    output.push_str("All Treaties\n");
    if state.loading {
        output.push_str("Loading treaties...\n");
        return;
    }
    for treaty in &state.treaties {
        output.push_str(&format!("+ {}\n", treaty.name));
        output.push_str(&format!("|   {}\n", signed_label(treaty)));
        if !treaty.tribes.is_empty() {
            output.push_str(&format!("|   {}\n", tribe_summary(treaty, CARD_TRIBES)));
        }
        output.push_str(&format!("|   [{}]\n", treaty.status.as_str()));
    }
    output.push_str(&plural(state.treaties.len(), "treaty", "treaties"));
    output.push('\n');
}

pub fn render_tribes(output: &mut String, state: &AppState) {
    output.push_str("Tribal Nations\n");
    let tally = tally_tribes(state);
    if tally.is_empty() {
        output.push_str("No tribal nations in the loaded treaties.\n");
        return;
    }
    for entry in &tally {
        output.push_str(&format!(
            "  {} ({})\n",
            entry.name,
            plural(entry.treaties, "treaty", "treaties")
        ));
    }
}

pub fn render_about(output: &mut String) {
    output.push_str(
        "About Windwalker\n\
         Windwalker maps treaties between the United States and tribal nations,\n\
         signed from 1778 until Congress ended treaty-making in 1871.\n\
         Boundaries, dates and texts are drawn from Kappler's Indian Affairs:\n\
         Laws and Treaties, the Statutes at Large and Native Land Digital.\n\
         Certainty badges: ! verified, ~ reported or uncertain.\n",
    );
}
