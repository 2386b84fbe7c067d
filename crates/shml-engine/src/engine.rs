//! Engine facade: escape, validate, extract, decode.

use std::collections::BTreeMap;

use crate::decode::Decoder;
use crate::error::EngineError;
use crate::extract::extract;
use crate::rule::RuleSet;
use crate::sentinel::{SentinelPool, Sentinels};
use crate::state::{RenderOutput, SessionState};

/// Escape the characters with meaning in HTML.
///
/// Applied to every input before extraction, so raw input can never forge
/// output markup. Rules therefore match the escaped forms (`&lt;`, `&amp;`).
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Renders text through a rule set.
///
/// Markers are drawn once at construction and never change; an engine can be
/// shared between threads and every render call owns its own block table and
/// session state.
#[derive(Clone, Debug)]
pub struct Engine {
    pool: SentinelPool,
    sentinels: Sentinels,
}

impl Engine {
    /// Engine over the Unicode noncharacters.
    pub fn new() -> Result<Self, EngineError> {
        Self::from_pool(SentinelPool::new())
    }

    /// Engine drawing its markers from `pool`.
    pub fn from_pool(mut pool: SentinelPool) -> Result<Self, EngineError> {
        let sentinels = Sentinels::draw(&mut pool)?;
        tracing::debug!(remaining = pool.remaining(), "Drew placeholder markers");
        Ok(Self { pool, sentinels })
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }

    /// Render a fragment without side-channel state.
    pub fn render_inline(&self, text: &str, rules: &RuleSet) -> Result<String, EngineError> {
        let mut state = SessionState::new();
        self.render(text, rules, &mut state)
    }

    /// Render a full document.
    ///
    /// The text is prefixed with a line break while rules run, so
    /// line-anchored rules treat the first line like any other; the prefix is
    /// removed from the output. `properties` seeds the property map.
    pub fn render_document(
        &self,
        text: &str,
        rules: &RuleSet,
        properties: BTreeMap<String, String>,
    ) -> Result<RenderOutput, EngineError> {
        self.pool.validate(text)?;

        let mut state = SessionState::with_properties(properties);
        let html = self.render(&format!("\n{text}"), rules, &mut state)?;
        let html = html.strip_prefix('\n').map(str::to_owned).unwrap_or(html);
        Ok(state.into_output(html))
    }

    fn render(
        &self,
        text: &str,
        rules: &RuleSet,
        state: &mut SessionState,
    ) -> Result<String, EngineError> {
        self.pool.validate(text)?;
        let escaped = escape_html(text);
        let (encoded, table) = extract(&escaped, rules, &self.sentinels);
        tracing::debug!(rules = rules.len(), blocks = table.len(), "Extraction complete");

        let html = Decoder::new(rules, &table, &self.sentinels, state).decode(&encoded)?;
        // Render functions may emit arbitrary text; nothing reserved may leak.
        self.pool.validate(&html)?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    // Ensure Engine is Send + Sync for concurrent render calls
    static_assertions::assert_impl_all!(super::Engine: Send, Sync);

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rule::Rule;
    use crate::state::TocEntry;

    fn inline_rules() -> RuleSet {
        RuleSet::new()
            .with_rule(Rule::parse("strong", r"\*\*(?P<TEXT>[^*\n][^\n]*?)\*\*").unwrap())
            .unwrap()
            .with_rule(Rule::parse("em", r"\*(?P<TEXT>[^*\n][^\n]*?)\*").unwrap())
            .unwrap()
    }

    fn heading_rules() -> RuleSet {
        let heading = Rule::parse("heading", r"(?m)^(?P<count>#{1,6})[ \t]?(?P<TEXT>[^\n]*)$")
            .unwrap()
            .block()
            .with_render(|block, decoder| {
                let level = block.capture("count").unwrap_or_default().len();
                let title = decoder.decode(block.text())?;
                let id = decoder.register_id(&format!("h{level}:{}", title.to_lowercase()));
                decoder.push_toc(TocEntry {
                    level: u8::try_from(level).unwrap_or(6),
                    title: title.clone(),
                    id: id.clone(),
                });
                Ok(format!("<h{level} id=\"{id}\"><a href=\"#{id}\">{title}</a></h{level}>"))
            });
        let mut rules = RuleSet::new().with_rule(heading).unwrap();
        rules.merge_missing(&inline_rules());
        rules
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""it's""#), "&quot;it&#x27;s&quot;");
    }

    #[test]
    fn test_render_inline() {
        let engine = Engine::new().unwrap();
        let html = engine.render_inline("Hello **World**!", &inline_rules()).unwrap();
        assert_eq!(html, "Hello <strong>World</strong>!");
    }

    #[test]
    fn test_strong_wins_over_em() {
        let engine = Engine::new().unwrap();
        assert_eq!(engine.render_inline("**a**", &inline_rules()).unwrap(), "<strong>a</strong>");
    }

    #[test]
    fn test_same_rule_nesting_resolves_first_pair() {
        let engine = Engine::new().unwrap();
        let html = engine
            .render_inline("**outer **not-inner** outer**", &inline_rules())
            .unwrap();
        assert_eq!(html, "<strong>outer </strong>not-inner<strong> outer</strong>");
    }

    #[test]
    fn test_reserved_characters_escaped_once() {
        let engine = Engine::new().unwrap();
        let html = engine.render_inline("a < b & c", &inline_rules()).unwrap();
        assert_eq!(html, "a &lt; b &amp; c");
        let html = engine.render_inline("&lt;", &inline_rules()).unwrap();
        assert_eq!(html, "&amp;lt;");
    }

    #[test]
    fn test_contaminated_input() {
        let engine = Engine::new().unwrap();
        let err = engine
            .render_inline("**a**\u{FFFE}", &inline_rules())
            .unwrap_err();
        assert!(matches!(err, EngineError::ContaminatedInput { position: 5, .. }));

        let err = engine
            .render_document("\u{FDD0}", &heading_rules(), BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::ContaminatedInput { position: 0, .. }));
    }

    #[test]
    fn test_output_is_deterministic_and_clean() {
        let rules = inline_rules();
        let text = "*a* **b** ***c*** **d *e* f**";
        let first = Engine::new().unwrap().render_inline(text, &rules).unwrap();
        let second = Engine::new().unwrap().render_inline(text, &rules).unwrap();

        assert_eq!(first, second);
        assert!(!SentinelPool::new().contains_reserved(&first));
    }

    #[test]
    fn test_render_document_heading() {
        let engine = Engine::new().unwrap();
        let output = engine
            .render_document("# Title\n", &heading_rules(), BTreeMap::new())
            .unwrap();

        assert_eq!(
            output.html,
            "<h1 id=\"h1:title\"><a href=\"#h1:title\">Title</a></h1>\n"
        );
        assert!(output.ids.contains("h1:title"));
        assert_eq!(output.toc.len(), 1);
        assert_eq!(output.toc[0].title, "Title");
    }

    #[test]
    fn test_render_document_without_trailing_newline() {
        let engine = Engine::new().unwrap();
        let output = engine
            .render_document("# A\n# A", &heading_rules(), BTreeMap::new())
            .unwrap();

        assert_eq!(
            output.html,
            concat!(
                "<h1 id=\"h1:a\"><a href=\"#h1:a\">A</a></h1>\n",
                "<h1 id=\"h1:a-1\"><a href=\"#h1:a-1\">A</a></h1>",
            )
        );
        assert_eq!(output.ids.len(), 2);
    }

    #[test]
    fn test_render_document_keeps_trailing_backslash() {
        let escaped = Rule::parse("escaped", r"\\(?P<what>[^ntp])")
            .unwrap()
            .with_render(|block, _| Ok(block.capture("what").unwrap_or_default().to_owned()));
        let rules = RuleSet::new().with_rule(escaped).unwrap();
        let engine = Engine::new().unwrap();

        for (text, expected) in [("\\", "\\"), ("a\\", "a\\"), ("\\*a", "*a")] {
            let output = engine.render_document(text, &rules, BTreeMap::new()).unwrap();
            assert_eq!(output.html, expected);
        }
    }

    #[test]
    fn test_render_document_keeps_initial_properties() {
        let engine = Engine::new().unwrap();
        let properties = BTreeMap::from([("author".to_owned(), "Jane".to_owned())]);
        let output = engine
            .render_document("plain", &heading_rules(), properties)
            .unwrap();

        assert_eq!(output.html, "plain");
        assert_eq!(output.properties.get("author").map(String::as_str), Some("Jane"));
    }

    #[test]
    fn test_leaking_render_function_is_rejected() {
        let rules = RuleSet::new()
            .with_rule(
                Rule::parse("leak", "x")
                    .unwrap()
                    .with_render(|_, _| Ok("\u{FDEF}".to_owned())),
            )
            .unwrap();
        let err = Engine::new().unwrap().render_inline("x", &rules).unwrap_err();
        assert!(matches!(err, EngineError::ContaminatedInput { .. }));
    }

    #[test]
    fn test_small_pool_exhausts() {
        let pool = SentinelPool::from_markers(vec!['\u{FDD0}', '\u{FDD1}', '\u{FDD2}']);
        let err = Engine::from_pool(pool).unwrap_err();
        assert!(matches!(err, EngineError::PoolExhausted { drawn: 3 }));
    }
}
