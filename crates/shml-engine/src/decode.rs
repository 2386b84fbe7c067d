//! Decode pass: resolve placeholders through render functions.

use crate::block::BlockTable;
use crate::error::EngineError;
use crate::extract::extract_into;
use crate::rule::RuleSet;
use crate::sentinel::Sentinels;
use crate::state::{SessionState, TocEntry};

/// Resolves placeholders for one render session.
///
/// Render functions receive the decoder so they can resolve placeholders
/// inside captures they control and reach the session's side-channel state.
pub struct Decoder<'a> {
    rules: &'a RuleSet,
    table: &'a BlockTable,
    sentinels: &'a Sentinels,
    state: &'a mut SessionState,
    /// Placeholders currently being rendered, innermost last.
    active: Vec<String>,
}

impl<'a> Decoder<'a> {
    pub fn new(
        rules: &'a RuleSet,
        table: &'a BlockTable,
        sentinels: &'a Sentinels,
        state: &'a mut SessionState,
    ) -> Self {
        Self {
            rules,
            table,
            sentinels,
            state,
            active: Vec::new(),
        }
    }

    /// Replace every placeholder in `text` with its rendered form.
    ///
    /// Placeholders are resolved left to right; rendered output is decoded
    /// again until no placeholder remains.
    pub fn decode(&mut self, text: &str) -> Result<String, EngineError> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(range) = self.sentinels.find_placeholder(rest)? {
            output.push_str(&rest[..range.start]);
            let rendered = self.resolve(&rest[range.clone()])?;
            output.push_str(&rendered);
            rest = &rest[range.end..];
        }
        output.push_str(rest);
        Ok(output)
    }

    fn resolve(&mut self, placeholder: &str) -> Result<String, EngineError> {
        let (table, rules) = (self.table, self.rules);
        let unresolved = || EngineError::UnresolvedBlock {
            placeholder: placeholder.to_owned(),
        };
        let block = table.get(placeholder).ok_or_else(unresolved)?;
        let rule = rules.get(block.rule()).ok_or_else(unresolved)?;

        if self.active.iter().any(|active| active == placeholder) {
            return Err(EngineError::CyclicBlock {
                rule: block.rule().to_owned(),
            });
        }

        self.active.push(placeholder.to_owned());
        let rendered = rule
            .render(block, self)
            .and_then(|rendered| self.decode(&rendered));
        self.active.pop();

        tracing::trace!(rule = block.rule(), "Resolved block");
        rendered
    }

    /// Render `text` with an independent rule set inside this session.
    ///
    /// Placeholders in `text` are resolved first; the result then goes
    /// through a full extraction and decode with `rules`. Side-channel state
    /// is shared with the current session.
    pub fn render_nested(&mut self, rules: &RuleSet, text: &str) -> Result<String, EngineError> {
        let text = self.decode(text)?;
        let mut table = BlockTable::new();
        let encoded = extract_into(&text, rules, self.sentinels, &mut table);
        Decoder::new(rules, &table, self.sentinels, self.state).decode(&encoded)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.state.property(key)
    }

    /// Record a property unless the key already has a value.
    pub fn insert_property(&mut self, key: &str, value: &str) -> bool {
        self.state.insert_property(key, value)
    }

    /// Register an anchor id, returning the deduplicated form.
    pub fn register_id(&mut self, requested: &str) -> String {
        self.state.register_id(requested)
    }

    pub fn push_toc(&mut self, entry: TocEntry) {
        self.state.push_toc(entry);
    }
}
