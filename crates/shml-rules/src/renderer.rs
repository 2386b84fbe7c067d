//! Ready-to-use renderer over the built-in rule sets.

use std::collections::BTreeMap;

use shml_engine::{Engine, EngineError, RenderOutput, RuleSet};

use crate::document::document_rules;
use crate::highlight::Highlighter;
use crate::inline::inline_rules;

/// Options for building the built-in rule sets.
#[derive(Clone, Debug)]
pub struct RuleOptions {
    /// Custom `:name:` tokens and their replacement HTML.
    pub tokens: BTreeMap<String, String>,
    /// Highlight fenced code blocks tagged with a known language.
    pub highlight: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            tokens: BTreeMap::new(),
            highlight: true,
        }
    }
}

/// Engine bundled with the inline and document rule sets.
///
/// # Example
///
/// ```
/// use shml_rules::{Renderer, RuleOptions};
///
/// let renderer = Renderer::new(&RuleOptions::default())?;
/// assert_eq!(renderer.render_inline("**bold**")?, "<strong>bold</strong>");
///
/// let output = renderer.render_document("title: Notes\n# ${title}\n", Default::default())?;
/// assert_eq!(output.properties["title"], "Notes");
/// assert_eq!(output.toc[0].title, "Notes");
/// # Ok::<(), shml_engine::EngineError>(())
/// ```
#[derive(Clone, Debug)]
pub struct Renderer {
    engine: Engine,
    inline: RuleSet,
    document: RuleSet,
}

impl Renderer {
    pub fn new(options: &RuleOptions) -> Result<Self, EngineError> {
        let engine = Engine::new()?;
        let highlighter = if options.highlight {
            Some(Highlighter::new()?)
        } else {
            None
        };
        let inline = inline_rules(&options.tokens)?;
        let document = document_rules(engine.sentinels(), &inline, highlighter)?;
        tracing::debug!(
            inline = inline.len(),
            document = document.len(),
            highlight = options.highlight,
            "Built rule sets"
        );
        Ok(Self {
            engine,
            inline,
            document,
        })
    }

    /// Render a fragment with the inline rules.
    pub fn render_inline(&self, text: &str) -> Result<String, EngineError> {
        self.engine.render_inline(text, &self.inline)
    }

    /// Render a document with the document rules.
    pub fn render_document(
        &self,
        text: &str,
        properties: BTreeMap<String, String>,
    ) -> Result<RenderOutput, EngineError> {
        self.engine.render_document(text, &self.document, properties)
    }

    pub fn inline_rules(&self) -> &RuleSet {
        &self.inline
    }

    pub fn document_rules(&self) -> &RuleSet {
        &self.document
    }
}
