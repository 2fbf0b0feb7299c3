//! Text projection of [`AppState`].
//!
//! Rendering is a pure function of the state snapshot: it never mutates
//! anything and can be re-run after every committed update. The layout
//! mirrors the web client: navigation bar, then the page for the current
//! view, then the detail panel when open and the temporal slider.
//!
//! Example output (map view):
//! ```text
//! Windwalker | Native Treaty Mapping Initiative
//! [Map]  Treaties  Tribal Nations  About
//!
//! Treaties
//! ! Treaty with the Delawares
//!     Signed: 1778-09-17
//!     Tribes: Delaware
//!     [Active]
//! 1 treaty
//!
//! 1871 (End of Treaty Era)
//! 1778 [========================================] 1871
//! ◀  ▶  ▶▶  Reset
//! ```

mod detail;
mod pages;
mod sidebar;

use crate::models::{View, END_OF_TREATY_ERA, FIRST_TREATY_YEAR};
use crate::state::AppState;

pub use detail::render_detail;
pub use pages::{render_about, render_treaty_grid, render_tribes, tally_tribes, TribeTally};
pub use sidebar::{render_search_results, render_treaty_list};

const TITLE: &str = "Windwalker | Native Treaty Mapping Initiative";
const PLAY: char = '▶';
const PAUSE: char = '⏸';
const SLIDER_WIDTH: usize = 40;

/// Render the whole screen for `state`.
pub fn render(state: &AppState) -> String {
    let mut output = String::new();
    render_nav(&mut output, state.current_view);
    output.push('\n');

    match state.current_view {
        View::Map => {
            render_search_results(&mut output, state);
            render_treaty_list(&mut output, state);
            render_map_panel(&mut output, state);
        }
        View::Treaties => render_treaty_grid(&mut output, state),
        View::Tribes => render_tribes(&mut output, state),
        View::About => render_about(&mut output),
    }

    if state.detail_panel_open {
        if let Some(treaty) = &state.selected_treaty {
            output.push('\n');
            render_detail(&mut output, treaty, state.detail_tab);
        }
    }

    output.push('\n');
    render_slider(&mut output, state.year_cutoff, state.playing);

    if let Some(error) = &state.last_error {
        output.push('\n');
        output.push_str(&format!("Error ({}): {}\n", error.kind, error.message));
    }
    output
}

/// Title line plus navigation links, the active one in brackets.
pub fn render_nav(output: &mut String, active: View) {
    output.push_str(TITLE);
    output.push('\n');
    let links: Vec<String> = View::ALL
        .iter()
        .map(|view| {
            if *view == active {
                format!("[{}]", view.label())
            } else {
                view.label().to_string()
            }
        })
        .collect();
    output.push_str(&links.join("  "));
    output.push('\n');
}

/// Year label, position bar and playback controls.
pub fn render_slider(output: &mut String, year: i32, playing: bool) {
    output.push_str(&year_label(year));
    output.push('\n');

    let span = (END_OF_TREATY_ERA - FIRST_TREATY_YEAR) as usize;
    let offset = (year.clamp(FIRST_TREATY_YEAR, END_OF_TREATY_ERA) - FIRST_TREATY_YEAR) as usize;
    let filled = offset * SLIDER_WIDTH / span;
    output.push_str(&format!(
        "{} [{}{}] {}\n",
        FIRST_TREATY_YEAR,
        "=".repeat(filled),
        "-".repeat(SLIDER_WIDTH - filled),
        END_OF_TREATY_ERA
    ));

    let toggle = if playing { PAUSE } else { PLAY };
    output.push_str(&format!("◀  {}  ▶▶  Reset\n", toggle));
}

/// `"1850"`, or `"1871 (End of Treaty Era)"` at the last year.
pub fn year_label(year: i32) -> String {
    if year >= END_OF_TREATY_ERA {
        format!("{} (End of Treaty Era)", year)
    } else {
        year.to_string()
    }
}

fn render_map_panel(output: &mut String, state: &AppState) {
    output.push('\n');
    if state.boundaries_loaded {
        output.push_str(&format!(
            "Map: {} boundaries visible\n",
            state.visible_boundaries
        ));
    } else {
        output.push_str("Map: boundaries not loaded\n");
    }

    if let Some(popup) = &state.map_popup {
        output.push_str(&format!("  Popup: {}\n", popup.name));
        if let Some(link) = &popup.link {
            output.push_str(&format!("  View on Native Land: {}\n", link));
        }
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}
