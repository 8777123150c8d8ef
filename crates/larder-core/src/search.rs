//! Client-side substring search over entries.
//!
//! Search is case-insensitive and matches the stringified value of every
//! field of every entry, identifier included. An empty term matches
//! everything. This runs synchronously over the in-memory list held by the
//! data-manager; there is no server-side search.

use crate::models::Entry;

/// Whether an entry matches the search term.
pub fn entry_matches(entry: &Entry, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    if entry.id.to_string().to_lowercase().contains(&needle) {
        return true;
    }
    entry
        .fields
        .values()
        .any(|value| stringify(value).to_lowercase().contains(&needle))
}

/// Filter a list down to matching entries, preserving order.
pub fn filter_entries(entries: &[Entry], term: &str) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| entry_matches(e, term))
        .cloned()
        .collect()
}

// Strings match on their content; arrays match on their comma-joined
// elements (so "summer" finds a seasons entry); everything else matches on
// its JSON rendering.
fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
