//! Map-view sidebar: search results and the filtered treaty list.

use crate::models::Treaty;
use crate::state::AppState;

use super::plural;

const LIST_TRIBES: usize = 3;

pub fn render_search_results(output: &mut String, state: &AppState) {
    if state.search_query.is_empty() {
        return;
    }
    output.push_str(&format!("Search: {}\n", state.search_query));
    for result in &state.search_results {
        output.push_str(&format!("  [{}] {}\n", result.entity_type.as_str(), result.title));
        if let Some(snippet) = &result.snippet {
            output.push_str(&format!("      {}\n", snippet));
        }
    }
    output.push('\n');
}

/// Status-filtered treaty rows with a count footer.
pub fn render_treaty_list(output: &mut String, state: &AppState) {
    output.push_str("Treaties");
    if let Some(status) = state.status_filter {
        output.push_str(&format!(" (status: {})", status.as_str()));
    }
    output.push('\n');

    if state.loading {
        output.push_str("Loading treaties...\n");
        return;
    }

    let displayed = state.displayed_treaties();
    if displayed.is_empty() {
        match state.status_filter {
            Some(status) => output.push_str(&format!(
                "No treaties found with status \"{}\".\n",
                status.as_str()
            )),
            None => output.push_str("No treaties found.\n"),
        }
    }

    let selected = state.selected_treaty.as_ref().map(|t| t.id.as_str());
    for treaty in &displayed {
        render_row(output, treaty, selected == Some(treaty.id.as_str()));
    }
    output.push_str(&plural(displayed.len(), "treaty", "treaties"));
    output.push('\n');
}

fn render_row(output: &mut String, treaty: &Treaty, selected: bool) {
    let marker = if selected { "> " } else { "" };
    output.push_str(&format!(
        "{}{} {}\n",
        marker,
        treaty.display_certainty().badge(),
        treaty.name
    ));
    output.push_str(&format!("    Signed: {}\n", signed_label(treaty)));
    if !treaty.tribes.is_empty() {
        output.push_str(&format!("    Tribes: {}\n", tribe_summary(treaty, LIST_TRIBES)));
    }
    output.push_str(&format!("    [{}]\n", treaty.status.as_str()));
}

/// Signed date as `YYYY-MM-DD`, the raw text the service sent, or "Unknown".
pub(super) fn signed_label(treaty: &Treaty) -> String {
    match (&treaty.signed_date, &treaty.signed_date_text) {
        (Some(date), _) => date.format("%Y-%m-%d").to_string(),
        (None, Some(text)) if !text.trim().is_empty() => text.clone(),
        _ => "Unknown".to_string(),
    }
}

/// First `limit` tribe names, then `+N more` for the rest.
pub(super) fn tribe_summary(treaty: &Treaty, limit: usize) -> String {
    let names: Vec<&str> = treaty
        .tribes
        .iter()
        .take(limit)
        .map(|t| t.name.as_str())
        .collect();
    let mut summary = names.join(", ");
    if treaty.tribes.len() > limit {
        summary.push_str(&format!(" +{} more", treaty.tribes.len() - limit));
    }
    summary
}
