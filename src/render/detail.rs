//! Detail panel for the selected treaty.

use crate::models::{DetailTab, Treaty};

use super::sidebar::signed_label;

const RELIABILITY_WIDTH: usize = 10;

/// Render the panel header, tab strip and the body of `tab`.
pub fn render_detail(output: &mut String, treaty: &Treaty, tab: DetailTab) {
    output.push_str(&format!(
        "{} {}  (close: x)\n",
        treaty.display_certainty().badge(),
        treaty.name
    ));

    let tabs: Vec<String> = DetailTab::ALL
        .iter()
        .map(|t| {
            if *t == tab {
                format!("[{}]", t.label())
            } else {
                t.label().to_string()
            }
        })
        .collect();
    output.push_str(&tabs.join("  "));
    output.push('\n');

    match tab {
        DetailTab::Overview => render_overview(output, treaty),
        DetailTab::Parties => render_parties(output, treaty),
        DetailTab::Text => render_text(output, treaty),
        DetailTab::Sources => render_sources(output, treaty),
    }
}

fn render_overview(output: &mut String, treaty: &Treaty) {
    output.push_str(&format!("Status: {}\n", treaty.status.as_str()));
    output.push_str(&format!("Certainty: {}\n", treaty.display_certainty().as_str()));

    output.push_str("Key Dates\n");
    output.push_str(&format!("  Signed: {}\n", signed_label(treaty)));
    let ratified = treaty
        .ratified_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    output.push_str(&format!("  Ratified: {}\n", ratified));

    output.push_str("Tribal Nations\n");
    if treaty.tribes.is_empty() {
        output.push_str("  None recorded\n");
    }
    for tribe in &treaty.tribes {
        output.push_str(&format!("  {}\n", tribe.name));
    }

    let citations: Vec<(&str, &str)> = [
        ("Kappler", treaty.kappler_citation.as_deref().or(treaty.kappler_ref.as_deref())),
        ("Statutes at Large", treaty.statutes_at_large.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect();
    if !citations.is_empty() {
        output.push_str("Citations\n");
        for (label, value) in citations {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }
}

fn render_parties(output: &mut String, treaty: &Treaty) {
    output.push_str("United States Commissioners\n");
    if treaty.us_commissioners.is_empty() {
        output.push_str("  None recorded\n");
    }
    for name in &treaty.us_commissioners {
        output.push_str(&format!("  {}\n", name));
    }
}

fn render_text(output: &mut String, treaty: &Treaty) {
    if let Some(preamble) = &treaty.preamble {
        output.push_str(preamble.trim());
        output.push_str("\n\n");
    }
    if treaty.articles.is_empty() {
        output.push_str("Treaty text not available.\n");
    }
    for article in &treaty.articles {
        output.push_str(&format!("Article {}\n", article.number));
        output.push_str(article.text.trim());
        output.push('\n');
    }
}

fn render_sources(output: &mut String, treaty: &Treaty) {
    if treaty.sources.is_empty() {
        output.push_str("No sources recorded.\n");
    }
    for source in &treaty.sources {
        let percent = source.reliability_percent();
        let filled = usize::from(percent) * RELIABILITY_WIDTH / 100;
        output.push_str(&format!("{} ({})\n", source.name, source.source_type));
        output.push_str(&format!(
            "  [{}{}] {}%\n",
            "#".repeat(filled),
            "-".repeat(RELIABILITY_WIDTH - filled),
            percent
        ));
        if let Some(url) = &source.url {
            output.push_str(&format!("  {}\n", url));
        }
    }
}
