//! Extraction pass: replace matched spans with placeholders.
//!
//! Rules run in registration order over the whole text. Every match is
//! stored as a [`Block`] and replaced by its placeholder before the next rule
//! runs, so later rules never see inside an earlier rule's span.
//!
//! Recursive captures are extracted again before their block is stored. The
//! nested pass skips the current rule and every rule already being expanded
//! further up, so each nesting level runs with strictly fewer rules and the
//! recursion depth is bounded by the size of the rule set.

use std::collections::BTreeMap;

use crate::block::{Block, BlockTable};
use crate::fingerprint::Fingerprint;
use crate::pattern::{MatchContext, is_recursive_capture};
use crate::rule::{Rule, RuleSet};
use crate::sentinel::Sentinels;

/// Run the extraction pass over `text`.
///
/// Returns the encoded text and the table of extracted blocks.
pub fn extract(text: &str, rules: &RuleSet, sentinels: &Sentinels) -> (String, BlockTable) {
    let mut table = BlockTable::new();
    let encoded = extract_into(text, rules, sentinels, &mut table);
    (encoded, table)
}

/// Run the extraction pass, storing blocks in an existing table.
pub(crate) fn extract_into(
    text: &str,
    rules: &RuleSet,
    sentinels: &Sentinels,
    table: &mut BlockTable,
) -> String {
    Extraction {
        rules,
        sentinels,
        table,
        expanding: Vec::new(),
    }
    .run(text)
}

struct Extraction<'a> {
    rules: &'a RuleSet,
    sentinels: &'a Sentinels,
    table: &'a mut BlockTable,
    /// Indices of rules whose recursive captures are being processed.
    expanding: Vec<usize>,
}

impl Extraction<'_> {
    fn run(&mut self, text: &str) -> String {
        let rules = self.rules;
        let mut current = text.to_owned();
        for (index, rule) in rules.iter().enumerate() {
            if self.expanding.contains(&index) {
                continue;
            }
            current = self.apply(index, rule, &current);
        }
        current
    }

    fn apply(&mut self, index: usize, rule: &Rule, text: &str) -> String {
        let mut output = String::new();
        let mut last = 0;
        let mut count = 0usize;

        for context in rule.pattern().find_iter(text) {
            let captures = self.captures(index, rule, &context);
            let raw = context.as_str();
            let placeholder = self
                .sentinels
                .placeholder(rule.scope(), Fingerprint::of(rule.name(), raw));

            output.push_str(&text[last..context.start()]);
            output.push_str(&placeholder);
            last = context.end();
            count += 1;

            self.table
                .insert(Block::new(placeholder, rule.name(), raw, captures));
        }

        if count == 0 {
            return text.to_owned();
        }
        output.push_str(&text[last..]);
        tracing::debug!(rule = rule.name(), matches = count, "Extracted spans");
        output
    }

    fn captures(
        &mut self,
        index: usize,
        rule: &Rule,
        context: &MatchContext<'_>,
    ) -> BTreeMap<String, String> {
        let mut captures = BTreeMap::new();
        for name in rule.pattern().capture_names() {
            let Some(value) = context.name(name) else {
                continue;
            };
            let value = if is_recursive_capture(name) {
                self.expanding.push(index);
                let processed = self.run(value);
                self.expanding.pop();
                processed
            } else {
                value.to_owned()
            };
            captures.insert(name.to_owned(), value);
        }
        captures
    }
}
