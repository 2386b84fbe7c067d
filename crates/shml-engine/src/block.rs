//! Matched spans and the table that stores them.

use std::collections::{BTreeMap, HashMap};

/// Name of the capture the default renderer wraps.
pub const TEXT_CAPTURE: &str = "TEXT";

/// One matched span, recorded during extraction.
///
/// Recursive captures hold their processed form, which may contain nested
/// placeholders. Captures that did not participate in the match are absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    placeholder: String,
    rule: String,
    raw: String,
    captures: BTreeMap<String, String>,
}

impl Block {
    pub fn new(
        placeholder: impl Into<String>,
        rule: impl Into<String>,
        raw: impl Into<String>,
        captures: BTreeMap<String, String>,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            rule: rule.into(),
            raw: raw.into(),
            captures,
        }
    }

    /// Placeholder standing in for this span.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Name of the rule that matched.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Full matched text, as it was before extraction.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Value of a named capture.
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }

    /// All participating captures.
    pub fn captures(&self) -> &BTreeMap<String, String> {
        &self.captures
    }

    /// The `TEXT` capture, or an empty string.
    pub fn text(&self) -> &str {
        self.capture(TEXT_CAPTURE).unwrap_or_default()
    }
}

/// Placeholder → block mapping for one render call.
#[derive(Debug, Default)]
pub struct BlockTable {
    blocks: HashMap<String, Block>,
}

impl BlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block under its placeholder.
    ///
    /// Identical spans of the same rule share a placeholder; the later block
    /// replaces the earlier one. A fingerprint collision between different
    /// spans is logged and resolved the same way.
    pub fn insert(&mut self, block: Block) {
        if let Some(previous) = self.blocks.get(block.placeholder())
            && (previous.rule != block.rule || previous.raw != block.raw)
        {
            tracing::warn!(
                previous_rule = %previous.rule,
                rule = %block.rule,
                "Fingerprint collision, block overwritten"
            );
        }
        self.blocks.insert(block.placeholder.clone(), block);
    }

    pub fn get(&self, placeholder: &str) -> Option<&Block> {
        self.blocks.get(placeholder)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over stored blocks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block(placeholder: &str, rule: &str, raw: &str) -> Block {
        let captures =
            BTreeMap::from([(TEXT_CAPTURE.to_owned(), raw.trim_matches('*').to_owned())]);
        Block::new(placeholder, rule, raw, captures)
    }

    #[test]
    fn test_block_accessors() {
        let block = block("#1", "strong", "**a**");
        assert_eq!(block.placeholder(), "#1");
        assert_eq!(block.rule(), "strong");
        assert_eq!(block.raw(), "**a**");
        assert_eq!(block.text(), "a");
        assert_eq!(block.capture("missing"), None);
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let block = Block::new("#1", "hr", "---", BTreeMap::new());
        assert_eq!(block.text(), "");
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = BlockTable::new();
        assert!(table.is_empty());
        table.insert(block("#1", "strong", "**a**"));
        table.insert(block("#2", "em", "*b*"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("#2").map(Block::rule), Some("em"));
        assert!(table.get("#3").is_none());
    }

    #[test]
    fn test_collision_overwrites() {
        let mut table = BlockTable::new();
        table.insert(block("#1", "strong", "**a**"));
        table.insert(block("#1", "em", "*b*"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("#1").map(Block::raw), Some("*b*"));
    }
}
