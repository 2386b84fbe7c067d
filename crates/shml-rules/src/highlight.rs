//! Source-code highlighting rule sets.
//!
//! Each language is an independent [`RuleSet`] run over the (HTML-escaped)
//! contents of a fenced code block. Tokens are wrapped in
//! `<span class="hl-<kind>">`; everything else passes through unchanged.

use std::collections::BTreeMap;

use shml_engine::{EngineError, MatchContext, Rule, RuleSet};

/// Token description for one language.
#[derive(Clone, Debug)]
pub struct Language {
    /// Canonical name, as written after the opening fence.
    pub name: &'static str,
    /// Alternative fence tags.
    pub aliases: &'static [&'static str],
    /// Reserved words.
    pub keywords: &'static [&'static str],
    /// String literal patterns, matched against escaped source.
    pub strings: &'static [&'static str],
    /// Line comment opener.
    pub line_comment: &'static str,
    /// Block comment delimiters (escaped form).
    pub block_comment: Option<(&'static str, &'static str)>,
}

const DOUBLE_QUOTED: &str = r"&quot;(?:\\.|[^\\\n])*?&quot;";
const SINGLE_QUOTED: &str = r"&#x27;(?:\\.|[^\\\n])*?&#x27;";
const BACKTICK_QUOTED: &str = r"`(?:\\.|[^\\`])*`";

/// Built-in languages.
pub const LANGUAGES: &[Language] = &[
    Language {
        name: "rust",
        aliases: &["rs"],
        keywords: &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
            "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
            "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
            "trait", "true", "type", "unsafe", "use", "where", "while",
        ],
        // Char literals only: a lone quote is a lifetime.
        strings: &[DOUBLE_QUOTED, r"&#x27;(?:\\[^\n]{1,8}?|[^\\\n&])&#x27;"],
        line_comment: "//",
        block_comment: Some((r"/\*", r"\*/")),
    },
    Language {
        name: "python",
        aliases: &["py"],
        keywords: &[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
            "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
            "return", "try", "while", "with", "yield",
        ],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED],
        line_comment: "#",
        block_comment: None,
    },
    Language {
        name: "javascript",
        aliases: &["js", "jsx", "ts", "typescript"],
        keywords: &[
            "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
            "delete", "do", "else", "export", "extends", "false", "finally", "for", "function",
            "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
            "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
            "yield",
        ],
        strings: &[DOUBLE_QUOTED, SINGLE_QUOTED, BACKTICK_QUOTED],
        line_comment: "//",
        block_comment: Some((r"/\*", r"\*/")),
    },
];

impl Language {
    /// Whether `tag` names this language (case-insensitive).
    pub fn matches(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(tag))
    }

    /// Token rules for this language: strings, comments, numbers, keywords.
    pub fn rules(&self) -> Result<RuleSet, EngineError> {
        let mut rules = RuleSet::new();
        rules.register(token("string", &self.strings.join("|"))?)?;

        let mut comments = vec![format!("{}[^\n]*", regex::escape(self.line_comment))];
        if let Some((open, close)) = self.block_comment {
            comments.push(format!("(?s){open}.*?{close}"));
        }
        // `#` also opens escaped entities such as `&#x27;`.
        let comment = token("comment", &comments.join("|"))?
            .with_guard(|m: &MatchContext<'_>| m.before() != Some('&'));
        rules.register(comment)?;

        rules.register(token(
            "number",
            r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?)\b",
        )?)?;

        let keywords: Vec<String> = self.keywords.iter().map(|k| regex::escape(k)).collect();
        rules.register(token("keyword", &format!(r"\b(?:{})\b", keywords.join("|")))?)?;
        Ok(rules)
    }
}

fn token(kind: &'static str, source: &str) -> Result<Rule, EngineError> {
    Ok(Rule::parse(kind, source)?.with_render(move |block, _| {
        Ok(format!(r#"<span class="hl-{kind}">{}</span>"#, block.raw()))
    }))
}

/// Rule sets for every built-in language, looked up by fence tag.
#[derive(Clone, Debug, Default)]
pub struct Highlighter {
    languages: BTreeMap<&'static str, RuleSet>,
}

impl Highlighter {
    /// Highlighter with all built-in languages.
    pub fn new() -> Result<Self, EngineError> {
        let mut languages = BTreeMap::new();
        for language in LANGUAGES {
            languages.insert(language.name, language.rules()?);
        }
        Ok(Self { languages })
    }

    /// Rule set for a fence tag, if the language is known.
    pub fn rules_for(&self, tag: &str) -> Option<&RuleSet> {
        let language = LANGUAGES.iter().find(|language| language.matches(tag))?;
        self.languages.get(language.name)
    }

    /// Canonical names of the supported languages.
    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.languages.keys().copied()
    }
}
