//! Side-channel state accumulated during one document render.
//!
//! Only a few rules touch it: the property rule records values, the template
//! rule reads them, and the heading rule registers anchor ids and outline
//! entries. Everything here lives for exactly one render call.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Rendered heading content.
    pub title: String,
    /// Anchor id, unique within the document.
    pub id: String,
}

/// Result of a document render.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Properties recorded by the document, merged over the initial map.
    pub properties: BTreeMap<String, String>,
    /// Registered anchor ids.
    pub ids: BTreeSet<String>,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Mutable state shared by all render functions of one session.
#[derive(Debug, Default)]
pub struct SessionState {
    properties: BTreeMap<String, String>,
    ids: BTreeSet<String>,
    /// Occurrences per requested id, for `-N` suffixes.
    id_counts: HashMap<String, usize>,
    toc: Vec<TocEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with caller-supplied properties.
    pub fn with_properties(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            ..Self::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Record a property unless the key already has a value.
    ///
    /// Returns whether the value was stored.
    pub fn insert_property(&mut self, key: &str, value: &str) -> bool {
        if self.properties.contains_key(key) {
            return false;
        }
        self.properties.insert(key.to_owned(), value.to_owned());
        true
    }

    /// Register an anchor id and return the unique form actually used.
    ///
    /// The first request for an id gets it unchanged; later requests get
    /// `-1`, `-2`, ... appended, skipping forms that are already taken.
    pub fn register_id(&mut self, requested: &str) -> String {
        let count = self.id_counts.entry(requested.to_owned()).or_default();
        let mut id = match *count {
            0 => requested.to_owned(),
            n => format!("{requested}-{n}"),
        };
        *count += 1;
        while self.ids.contains(&id) {
            id = format!("{requested}-{}", *count);
            *count += 1;
        }
        self.ids.insert(id.clone());
        id
    }

    pub fn push_toc(&mut self, entry: TocEntry) {
        self.toc.push(entry);
    }

    /// Package the accumulated state with the rendered HTML.
    pub fn into_output(self, html: String) -> RenderOutput {
        RenderOutput {
            html,
            properties: self.properties,
            ids: self.ids,
            toc: self.toc,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut state = SessionState::with_properties(BTreeMap::from([(
            "author".to_owned(),
            "Jane".to_owned(),
        )]));

        assert!(!state.insert_property("author", "John"));
        assert!(state.insert_property("title", "Notes"));
        assert!(!state.insert_property("title", "Other"));

        assert_eq!(state.property("author"), Some("Jane"));
        assert_eq!(state.property("title"), Some("Notes"));
    }

    #[test]
    fn test_register_id_dedupes() {
        let mut state = SessionState::new();
        assert_eq!(state.register_id("h1:intro"), "h1:intro");
        assert_eq!(state.register_id("h1:intro"), "h1:intro-1");
        assert_eq!(state.register_id("h1:intro"), "h1:intro-2");
        assert_eq!(state.register_id("h2:usage"), "h2:usage");
        assert_eq!(state.into_output(String::new()).ids.len(), 4);
    }

    #[test]
    fn test_register_id_skips_taken_suffix() {
        let mut state = SessionState::new();
        assert_eq!(state.register_id("a-1"), "a-1");
        assert_eq!(state.register_id("a"), "a");
        assert_eq!(state.register_id("a"), "a-2");
    }

    #[test]
    fn test_into_output() {
        let mut state = SessionState::new();
        state.insert_property("lang", "en");
        let id = state.register_id("h1:x");
        state.push_toc(TocEntry {
            level: 1,
            title: "X".to_owned(),
            id: id.clone(),
        });

        let output = state.into_output("<p>x</p>".to_owned());
        assert_eq!(output.html, "<p>x</p>");
        assert_eq!(output.properties.get("lang").map(String::as_str), Some("en"));
        assert!(output.ids.contains("h1:x"));
        assert_eq!(output.toc, vec![TocEntry { level: 1, title: "X".to_owned(), id }]);
    }
}
