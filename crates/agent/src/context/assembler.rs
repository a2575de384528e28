//! Category-driven catalog rendering.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical snapshot, classification, and query
//! text always produce byte-identical output. No randomness and no clock
//! reads — the hours text is whatever the snapshot carries.

use std::collections::BTreeMap;

use maitre_core::catalog::{CatalogItem, CatalogSnapshot};
use maitre_core::classify::{ClassificationResult, QueryCategory};

/// Marker returned instead of an empty string when there is nothing to
/// render, so callers can tell "no data" from "not assembled".
pub const NO_CATALOG_DATA: &str = "No catalog data is available for this venue.";

/// Hard cap on rendered item lines for the filtered strategies.
const MAX_MATCHED_ITEMS: usize = 15;

/// Example names listed per category in the overview rendering.
const MAX_OVERVIEW_EXAMPLES: usize = 3;

/// Query tokens shorter than this carry no signal ("do", "the", ...).
const MIN_TOKEN_CHARS: usize = 4;

/// Upper bound on the whole assembled context.
const MAX_CONTEXT_CHARS: usize = 4096;

/// Assembles the bounded catalog context for one request.
pub struct ContextAssembler {
    max_items: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextAssembler {
    pub fn new() -> Self {
        Self {
            max_items: MAX_MATCHED_ITEMS,
        }
    }

    /// Override the matched-item cap.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Render the context for a classified query.
    pub fn assemble(
        &self,
        snapshot: &CatalogSnapshot,
        classification: &ClassificationResult,
        raw_text: &str,
    ) -> String {
        match classification.category {
            QueryCategory::Greeting => String::new(),
            QueryCategory::Hours => match &snapshot.hours {
                Some(hours) => format!("Opening hours: {hours}"),
                None => NO_CATALOG_DATA.into(),
            },
            _ if snapshot.is_empty() => NO_CATALOG_DATA.into(),
            QueryCategory::CatalogOverview => bounded(render_overview(snapshot)),
            QueryCategory::Recommendation => bounded(render_recommendations(snapshot)),
            QueryCategory::SpecificItem | QueryCategory::DietaryFilter | QueryCategory::Other => {
                bounded(self.render_matches(snapshot, raw_text))
            }
        }
    }

    /// Token-filtered item lines for item-level questions.
    fn render_matches(&self, snapshot: &CatalogSnapshot, raw_text: &str) -> String {
        let tokens = query_tokens(raw_text);
        let matches: Vec<&CatalogItem> = snapshot
            .items
            .iter()
            .filter(|item| item_matches(item, &tokens))
            .take(self.max_items)
            .collect();

        if matches.is_empty() {
            return "No menu items match the question.".into();
        }

        let mut out = String::from("Menu items relevant to the question:\n");
        for item in matches {
            out.push_str("- ");
            out.push_str(&format_item(item));
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

/// `name ($price) [attributes] {exclusions}`, omitting empty brackets.
fn format_item(item: &CatalogItem) -> String {
    let mut line = format!("{} (${:.2})", item.name, item.price);
    if !item.attributes.is_empty() {
        line.push_str(&format!(" [{}]", item.attributes.join(", ")));
    }
    if !item.exclusions.is_empty() {
        line.push_str(&format!(" {{{}}}", item.exclusions.join(", ")));
    }
    line
}

fn query_tokens(raw_text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = raw_text
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| w.len() >= MIN_TOKEN_CHARS)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

fn item_matches(item: &CatalogItem, tokens: &[String]) -> bool {
    let name = item.name.to_lowercase();
    let category = item.category.to_lowercase();
    tokens.iter().any(|token| {
        name.contains(token)
            || category.contains(token)
            || item
                .attributes
                .iter()
                .any(|a| a.to_lowercase().contains(token))
    })
}

/// Category headers with a few example names each, so a browse question
/// never dumps the entire catalog into the prompt.
fn render_overview(snapshot: &CatalogSnapshot) -> String {
    let mut by_category: BTreeMap<&str, Vec<&CatalogItem>> = BTreeMap::new();
    for item in &snapshot.items {
        by_category.entry(item.category.as_str()).or_default().push(item);
    }

    let mut out = String::from("Menu overview by category:\n");
    for (category, items) in by_category {
        let examples: Vec<&str> = items
            .iter()
            .take(MAX_OVERVIEW_EXAMPLES)
            .map(|i| i.name.as_str())
            .collect();
        let remainder = items.len().saturating_sub(MAX_OVERVIEW_EXAMPLES);

        out.push_str(&format!("{category}: {}", examples.join(", ")));
        if remainder > 0 {
            out.push_str(&format!(" (+{remainder} more)"));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// One representative item per category — diversity over volume.
fn render_recommendations(snapshot: &CatalogSnapshot) -> String {
    let mut picks: BTreeMap<&str, &CatalogItem> = BTreeMap::new();
    for item in &snapshot.items {
        picks.entry(item.category.as_str()).or_insert(item);
    }

    let mut out = String::from("One pick from each category:\n");
    for item in picks.values() {
        let blurb = match &item.description {
            Some(description) => description.clone(),
            None => item.attributes.join(", "),
        };
        out.push_str(&format!("- {} (${:.2})", item.name, item.price));
        if !blurb.is_empty() {
            out.push_str(&format!(" — {blurb}"));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Cut at the last whole line under the cap.
fn bounded(text: String) -> String {
    if text.len() <= MAX_CONTEXT_CHARS {
        return text;
    }

    let mut cut = MAX_CONTEXT_CHARS;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let cut = text[..cut].rfind('\n').unwrap_or(cut);
    text[..cut].trim_end().to_string()
}
