//! Rules and ordered rule sets.
//!
//! A [`Rule`] pairs a [`TextPattern`] with a [`Scope`] and an optional render
//! function. A [`RuleSet`] keeps rules in registration order; earlier rules
//! claim matching spans first during extraction.

use std::fmt;
use std::sync::Arc;

use crate::block::Block;
use crate::decode::Decoder;
use crate::error::{EngineError, RuleDefect};
use crate::pattern::{MatchContext, TextPattern};

/// Which delimiter a rule's placeholders carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Spans within a line of text.
    Inline,
    /// Structural spans such as headings, lists and paragraphs.
    Block,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Block => f.write_str("block"),
        }
    }
}

/// Render function turning a block into output text.
///
/// The decoder resolves placeholders inside captures and gives access to the
/// session's side-channel state.
pub type RenderFn = dyn Fn(&Block, &mut Decoder<'_>) -> Result<String, EngineError> + Send + Sync;

/// A named pattern with a scope and a render function.
#[derive(Clone)]
pub struct Rule {
    name: String,
    pattern: TextPattern,
    scope: Scope,
    render: Option<Arc<RenderFn>>,
}

impl Rule {
    /// Inline-scope rule rendered by the default renderer.
    pub fn new(name: impl Into<String>, pattern: TextPattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            scope: Scope::Inline,
            render: None,
        }
    }

    /// Compile `source` into an inline-scope rule.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, EngineError> {
        let name = name.into();
        let pattern = TextPattern::new(source).map_err(|e| EngineError::invalid_rule(&name, e))?;
        Ok(Self::new(name, pattern))
    }

    /// Switch to block scope.
    #[must_use]
    pub fn block(self) -> Self {
        self.with_scope(Scope::Block)
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Attach a guard to the rule's pattern.
    #[must_use]
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&MatchContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.pattern = self.pattern.with_guard(guard);
        self
    }

    /// Set the render function.
    #[must_use]
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Block, &mut Decoder<'_>) -> Result<String, EngineError> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Render `block`.
    ///
    /// Without a render function the rule name becomes a tag around the
    /// decoded `TEXT` capture: `<strong>…</strong>`.
    pub fn render(&self, block: &Block, decoder: &mut Decoder<'_>) -> Result<String, EngineError> {
        match &self.render {
            Some(render) => render(block, decoder),
            None => {
                let text = decoder.decode(block.text())?;
                Ok(format!("<{name}>{text}</{name}>", name = self.name))
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("scope", &self.scope)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

/// Ordered collection of uniquely named rules.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    ///
    /// Rejects patterns that match the empty string and names already taken.
    pub fn register(&mut self, rule: Rule) -> Result<(), EngineError> {
        if rule.pattern.matches_empty() {
            return Err(EngineError::invalid_rule(&rule.name, RuleDefect::MatchesEmpty));
        }
        if self.get(&rule.name).is_some() {
            return Err(EngineError::invalid_rule(&rule.name, RuleDefect::DuplicateName));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_rule(mut self, rule: Rule) -> Result<Self, EngineError> {
        self.register(rule)?;
        Ok(self)
    }

    /// Append every rule of `other` whose name is not yet present, keeping `other`'s order.
    pub fn merge_missing(&mut self, other: &RuleSet) {
        for rule in &other.rules {
            if self.get(&rule.name).is_none() {
                self.rules.push(rule.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Registration index of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }

    /// Copy of this set without the rule called `name`.
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        Self {
            rules: self.rules.iter().filter(|rule| rule.name != name).cloned().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rule names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
