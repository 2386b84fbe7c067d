//! Inline rule set.
//!
//! Rules are listed in precedence order: literal constructs (escapes, raw
//! text, comments, code) first so their contents stay opaque, then links so
//! their targets are not reformatted, then emphasis and the smaller
//! shorthands.

use std::collections::BTreeMap;

use shml_engine::{EngineError, Rule, RuleSet, is_noncharacter};

use crate::symbols;
use crate::util::{capture, sanitize_href};

const SPOILER_ATTRS: &str = concat!(
    r#"style="filter: blur(0.25em); cursor: pointer;" title="Show spoiler?" "#,
    r#"onclick="this.removeAttribute('style'); this.removeAttribute('title'); "#,
    r#"this.removeAttribute('onclick');""#,
);

/// Build the inline rule set.
///
/// `tokens` maps custom `:name:` tokens to their replacement HTML.
pub fn inline_rules(tokens: &BTreeMap<String, String>) -> Result<RuleSet, EngineError> {
    let mut rules = RuleSet::new();
    for rule in literal_rules()? {
        rules.register(rule)?;
    }

    rules.register(
        Rule::parse("code", "`(?P<text>[^`\n]*)`")?
            .with_render(|block, _| Ok(format!("<code>{}</code>", capture(block, "text")))),
    )?;

    rules.register(
        Rule::parse(
            "a",
            r"(?P<newtab>\+)?\[(?P<href>[^\]\n]*?)\]\((?P<TEXT>[^\n]*?)\)",
        )?
        // A target holding an earlier span would put markup inside the attribute.
        .with_guard(|m| !m.name("href").is_some_and(|href| href.chars().any(is_noncharacter)))
        .with_render(|block, decoder| {
            let text = decoder.decode(block.text())?;
            let target = if block.capture("newtab").is_some() {
                r#" target="_blank""#
            } else {
                ""
            };
            let href = sanitize_href(capture(block, "href"));
            Ok(format!(r#"<a href="{href}"{target}>{text}</a>"#))
        }),
    )?;

    rules.register(
        Rule::parse(
            "autolink",
            concat!(
                r"(?P<text>(?:(?P<protocol>https?://)|(?P<www>www\.))",
                r"(?P<link>\w(?:[\w-]*\w)?\.\w(?:[\w./?&#%=+;-]*[\w/])?))",
            ),
        )?
        .with_guard(|m| !m.before().is_some_and(|c| c.is_alphanumeric() || c == '/'))
        .with_render(|block, _| {
            let protocol = block.capture("protocol").unwrap_or("https://");
            Ok(format!(
                r#"<a href="{protocol}{www}{link}">{text}</a>"#,
                www = capture(block, "www"),
                link = capture(block, "link"),
                text = capture(block, "text"),
            ))
        }),
    )?;

    rules.register(
        Rule::parse("autolink_email", r"(?P<text>\w[\w.\-]*?@[\w.\-]+\.\w+)")?.with_render(
            |block, _| {
                let address = capture(block, "text");
                Ok(format!(r#"<a href="mailto:{address}">{address}</a>"#))
            },
        ),
    )?;

    rules.register(
        Rule::parse("symbol", r"/(?P<what>(?:&#x27;|&quot;|.).|\?|!)/")?
            .with_guard(|m| m.name("what").and_then(symbols::symbol).is_some())
            .with_render(|block, _| {
                Ok(symbols::symbol(capture(block, "what"))
                    .unwrap_or_else(|| block.raw().to_owned()))
            }),
    )?;

    rules.register(
        Rule::parse("unicode_shortcut", r"\b(?:TM|SS)\b|\([cCrR]\)|-&gt;|&lt;-")?.with_render(
            |block, _| {
                Ok(symbols::shortcut(block.raw())
                    .map_or_else(|| block.raw().to_owned(), str::to_owned))
            },
        ),
    )?;

    rules.register(Rule::parse("strong", r"\*\*(?P<TEXT>[^*\n][^\n]*?)\*\*")?)?;
    rules.register(Rule::parse("em", r"\*(?P<TEXT>[^*\n][^\n]*?)\*")?)?;
    for (name, marker) in [("u", "__"), ("del", "~~"), ("sup", "^^"), ("sub", ",,")] {
        let marker = regex::escape(marker);
        rules.register(Rule::parse(name, &format!(r"{marker}(?P<TEXT>[^\n]*?){marker}"))?)?;
    }

    rules.register(
        Rule::parse(
            "mark",
            r"\|\|(?:\[(?:color=)?(?P<color>[^\]\n]*?)\])?(?P<TEXT>[^\n]*?)\|\|",
        )?
        .with_render(|block, decoder| {
            let text = decoder.decode(block.text())?;
            Ok(match block.capture("color").filter(|color| !color.is_empty()) {
                Some(color) => format!(r#"<mark style="color:{color}">{text}</mark>"#),
                None => format!("<mark>{text}</mark>"),
            })
        }),
    )?;

    rules.register(
        Rule::parse(
            "span",
            r"&amp;&amp;(?:\[(?:color=)?(?P<color>[^\]\n]*?)\])?(?P<TEXT>[^\n]*?)&amp;&amp;",
        )?
        .with_render(|block, decoder| {
            let text = decoder.decode(block.text())?;
            let color = block.capture("color").filter(|color| !color.is_empty()).unwrap_or("red");
            Ok(format!(r#"<span style="color:{color}">{text}</span>"#))
        }),
    )?;

    rules.register(
        Rule::parse("spoiler", r"&lt;\?(?P<TEXT>[^\n]*?)\?&gt;")?.with_render(|block, decoder| {
            let text = decoder.decode(block.text())?;
            Ok(format!("<span {SPOILER_ATTRS}>{text}</span>"))
        }),
    )?;

    let tokens = tokens.clone();
    rules.register(
        Rule::parse("custom_token", r":(?P<what>[a-zA-Z0-9][a-zA-Z0-9_\-]*?):")?
            .with_guard({
                let tokens = tokens.clone();
                move |m| m.name("what").is_some_and(|name| tokens.contains_key(name))
            })
            .with_render(move |block, _| {
                Ok(tokens
                    .get(capture(block, "what"))
                    .cloned()
                    .unwrap_or_else(|| block.raw().to_owned()))
            }),
    )?;

    for (name, source, html) in [
        ("nbsp", r"\\p", "&nbsp;"),
        ("emsp", r"\\t", "&emsp;"),
        ("linebreak", r"\\n", "<br>"),
    ] {
        rules.register(Rule::parse(name, source)?.with_render(move |_, _| Ok(html.to_owned())))?;
    }

    rules.register(
        Rule::parse("wordbreak", "-/-")?
            .with_guard(|m| {
                let solid = |c: Option<char>| c.is_some_and(|c| !c.is_whitespace());
                solid(m.before()) && solid(m.after())
            })
            .with_render(|_, _| Ok("<wbr>".to_owned())),
    )?;

    rules.register(
        Rule::parse(
            "html",
            r"&lt;(?P<what>/?(?:code|em|i|strong|b|u|del|sub|sup|mark|span|wbr|br))&gt;",
        )?
        .with_render(|block, _| Ok(format!("<{}>", capture(block, "what")))),
    )?;

    Ok(rules)
}

/// Escapes, raw text and comments; shared with the document set.
pub(crate) fn literal_rules() -> Result<Vec<Rule>, EngineError> {
    Ok(vec![
        Rule::parse("escaped", r"\\(?P<what>[^ntp])")?
            .with_render(|block, _| Ok(capture(block, "what").to_owned())),
        Rule::parse("raw", r"(?s)&lt;&lt;/(?P<text>.*?)/&gt;&gt;")?
            .with_render(|block, _| Ok(capture(block, "text").to_owned())),
        Rule::parse("src_comment", r"(?s)&lt;!!--(?P<text>.*?)--&gt;")?
            .with_render(|_, _| Ok(String::new())),
        Rule::parse("comment", r"(?s)&lt;!--(?P<text>.*?)--&gt;")?
            .with_render(|block, _| Ok(format!("<!--{}-->", capture(block, "text")))),
    ])
}
