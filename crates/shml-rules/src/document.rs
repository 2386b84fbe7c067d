//! Document (block + inline) rule set.
//!
//! Block rules are line-anchored. The engine frames documents with line
//! breaks, so a guard requiring a preceding `\n` holds for every real line
//! start while rejecting matches at the start of a nested capture.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use shml_engine::{
    Block, Decoder, EngineError, Fingerprint, Rule, RuleSet, Scope, Sentinels, TocEntry,
};

use crate::highlight::Highlighter;
use crate::inline::literal_rules;
use crate::util::{capture, class_char, ends_line, sanitize_href, starts_line};

/// Trailing `- Author` on the last quoted line.
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-[ \t]*(?P<cite>\S[^\n]*)$").unwrap());

/// Quote marker at the start of a blockquote line.
static QUOTE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*&gt;&gt;&gt;[ \t]?").unwrap());

/// Bullet or number at the start of a list line.
static LIST_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:\+|\d+[.)])[ \t]*").unwrap());

/// Build the document rule set.
///
/// `inline` supplies the inline rules appended after the document-specific
/// literals; `highlighter` enables syntax highlighting of fenced code.
pub fn document_rules(
    sentinels: &Sentinels,
    inline: &RuleSet,
    highlighter: Option<Highlighter>,
) -> Result<RuleSet, EngineError> {
    let block_marker = class_char(sentinels.marker(Scope::Block));
    let mut rules = RuleSet::new();

    rules.register(code_block(highlighter)?)?;
    for rule in literal_rules()? {
        rules.register(rule)?;
    }

    rules.register(
        Rule::parse("property", r"(?m)^[ \t]*(?P<key>[a-zA-Z_][a-zA-Z_0-9]*):(?P<value>[^\n]*)$")?
            .block()
            .with_guard(|m| {
                let key = m.name("key").unwrap_or_default();
                starts_line(m) && ends_line(m) && !key.ends_with("http") && !key.ends_with("https")
            })
            .with_render(|block, decoder| {
                let value = decoder.decode(capture(block, "value"))?;
                decoder.insert_property(capture(block, "key"), value.trim());
                Ok(String::new())
            }),
    )?;

    rules.register(
        Rule::parse("template", r"\$\{(?P<key>[a-zA-Z_][a-zA-Z_0-9]*)\}")?.with_render(
            |block, decoder| {
                Ok(decoder
                    .property(capture(block, "key"))
                    .map_or_else(|| block.raw().to_owned(), str::to_owned))
            },
        ),
    )?;

    rules.register(
        Rule::parse(
            "image",
            concat!(
                r"!\[(?P<src>[^\s\]]*)",
                r"(?:[ \t]+(?P<height>auto|\d+)(?:[xX](?P<width>auto|\d+))?)?\]",
                r"(?:\((?P<alt>[^\n)]*)\))?",
            ),
        )?
        .with_render(render_image),
    )?;

    rules.merge_missing(inline);

    rules.register(
        Rule::parse(
            "text_align",
            concat!(
                r"[ \t]*@@[ \t]*",
                r"(?P<what>centered|center|left|right|justified-all|justify-all|justified|justify)",
                r"(?P<TEXT>[^\n]*(?:\n(?:[ \t]*\n)*[ \t]*(?:[^@ \t\n]|@[^@\n])[^\n]*)*)",
                r"(?:(?:\n[ \t]*)*\n[ \t]*@@[ \t]*reset[^\n]*)?",
            ),
        )?
        .block()
        .with_guard(starts_line)
        .with_render(|block, decoder| {
            let text = decoder.decode(block.text())?;
            let align = match capture(block, "what") {
                "centered" => "center",
                "justified" => "justify",
                "justified-all" => "justify-all",
                other => other,
            };
            Ok(format!(r#"<div style="text-align: {align};">{}</div>"#, text.trim()))
        }),
    )?;

    rules.register(
        Rule::parse(
            "heading",
            &format!(
                r"(?m)^[ \t]*(?P<count>#{{1,6}})(?:\[(?P<id>[a-zA-Z_][a-zA-Z_0-9]*)\])?[ \t]?(?P<TEXT>[^\n{block_marker}]*)$"
            ),
        )?
        .block()
        .with_guard(starts_line)
        .with_render(render_heading),
    )?;

    rules.register(
        Rule::parse("hr", r"(?m)^[ \t]*(?:-{3,}|={3,})[ \t]*$")?
            .block()
            .with_guard(starts_line)
            .with_render(|_, _| Ok("<hr>".to_owned())),
    )?;

    rules.register(
        Rule::parse(
            "table",
            r"(?s)\[\[(?:\n[ \t]*(?:title=)?(?P<title>[^,\n]*)\n)?(?P<contents>.*?)\]\]",
        )?
        .block()
        .with_render(|block, _| {
            Ok(render_table(block.capture("title"), capture(block, "contents")))
        }),
    )?;

    rules.register(
        Rule::parse("bullet_list", r"(?m)^[ \t]*\+[^\n]*(?:\n[ \t]*\+[^\n]*)*")?
            .block()
            .with_guard(starts_line)
            .with_render(|block, _| Ok(render_list("ul", block.raw()))),
    )?;

    rules.register(
        Rule::parse("ordered_list", r"(?m)^[ \t]*\d+[.)][^\n]*(?:\n[ \t]*\d+[.)][^\n]*)*")?
            .block()
            .with_guard(starts_line)
            .with_render(|block, _| Ok(render_list("ol", block.raw()))),
    )?;

    rules.register(
        Rule::parse(
            "blockquote",
            r"(?m)^[ \t]*&gt;&gt;&gt;[^\n]*(?:\n[ \t]*&gt;&gt;&gt;[^\n]*)*",
        )?
        .block()
        .with_guard(starts_line)
        .with_render(|block, _| Ok(render_blockquote(block.raw()))),
    )?;

    rules.register(
        Rule::parse(
            "block_html",
            r"&lt;(?P<what>/?(?:h[1-6]|hr|blockquote|ul|ol|li))&gt;",
        )?
        .block()
        .with_render(|block, _| Ok(format!("<{}>", capture(block, "what")))),
    )?;

    rules.register(
        Rule::parse("paragraph", &paragraph_source(&block_marker))?
        .block()
        .with_guard(starts_line)
        .with_render(|block, decoder| {
            let text = decoder.decode(capture(block, "text"))?;
            let text = text.trim();
            Ok(if text.is_empty() {
                String::new()
            } else {
                format!("<p>{text}</p>")
            })
        }),
    )?;

    Ok(rules)
}

/// Consecutive non-blank lines. A line ending in two spaces closes the paragraph.
fn paragraph_source(block_marker: &str) -> String {
    let any = format!(r"[^\n{block_marker}]");
    let solid = format!(r"[^ \t\n{block_marker}]");
    // Line tail that does not end in two spaces.
    let open_tail = format!(r"(?:{any}*[^ \n{block_marker}])? ?");
    let first = format!("{any}{open_tail}");
    let middle = format!(r"[ \t]*{solid}{open_tail}");
    let last = format!(r"[ \t]*{solid}{any}*");
    format!(r"(?P<text>{first}(?:\n{middle})*\n{last}|{any}+)")
}

fn code_block(highlighter: Option<Highlighter>) -> Result<Rule, EngineError> {
    let rule = Rule::parse(
        "code_block",
        r"(?s)```(?:(?P<lang>[A-Za-z0-9_+#-]+)\n)?(?P<text>.*?)```",
    )?;
    Ok(rule.block().with_render(move |block, decoder| {
        let text = capture(block, "text");
        let text = text.strip_prefix('\n').unwrap_or(text);
        let text = text.strip_suffix('\n').unwrap_or(text);
        let Some(lang) = block.capture("lang") else {
            return Ok(format!("<pre><code>{text}</code></pre>"));
        };
        let body = match highlighter.as_ref().and_then(|h| h.rules_for(lang)) {
            Some(rules) => decoder.render_nested(rules, text)?,
            None => text.to_owned(),
        };
        Ok(format!(r#"<pre><code class="language-{lang}">{body}</code></pre>"#))
    }))
}

fn render_image(block: &Block, decoder: &mut Decoder<'_>) -> Result<String, EngineError> {
    let mut html = format!(r#"<img src="{}""#, sanitize_href(capture(block, "src")));
    if let Some(alt) = block.capture("alt").filter(|alt| !alt.is_empty()) {
        let _ = write!(html, r#" alt="{}""#, decoder.decode(alt)?);
    }
    let height = block.capture("height");
    if let Some(height) = height {
        let _ = write!(html, r#" height="{height}""#);
    }
    if let Some(width) = block.capture("width").or(height) {
        let _ = write!(html, r#" width="{width}""#);
    }
    html.push('>');
    Ok(html)
}

fn render_heading(block: &Block, decoder: &mut Decoder<'_>) -> Result<String, EngineError> {
    let level = capture(block, "count").len();
    let title = decoder.decode(block.text())?;
    let title = title.trim();
    let id = match block.capture("id") {
        Some(id) => id.to_owned(),
        None => Fingerprint::of_text(title).to_hex(),
    };
    let anchor = decoder.register_id(&format!("h{level}:{id}"));
    decoder.push_toc(TocEntry {
        level: u8::try_from(level).unwrap_or(6),
        title: title.to_owned(),
        id: anchor.clone(),
    });
    Ok(format!(
        r##"<h{level} id="{anchor}"><a href="#{anchor}" title="Link to section">{title}</a></h{level}>"##
    ))
}

fn render_table(title: Option<&str>, contents: &str) -> String {
    let mut rows = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(str::trim).collect::<Vec<_>>());

    let mut html = String::from("<table>");
    if let Some(title) = title.map(str::trim).filter(|title| !title.is_empty()) {
        let _ = write!(html, "\n<caption>{title}</caption>");
    }
    if let Some(head) = rows.next() {
        html.push_str("\n<thead>\n");
        push_row(&mut html, "th", &head);
        html.push_str("\n</thead>");
    }
    html.push_str("\n<tbody>");
    for row in rows {
        html.push('\n');
        push_row(&mut html, "td", &row);
    }
    html.push_str("\n</tbody>\n</table>");
    html
}

fn push_row(html: &mut String, cell: &str, cells: &[&str]) {
    html.push_str("<tr>");
    for value in cells {
        let _ = write!(html, "<{cell}>{value}</{cell}>");
    }
    html.push_str("</tr>");
}

fn render_list(tag: &str, raw: &str) -> String {
    let items: Vec<String> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<li>{}</li>", LIST_PREFIX_RE.replace(line, "").trim_end()))
        .collect();
    format!("<{tag}>\n{}\n</{tag}>", items.join("\n"))
}

fn render_blockquote(raw: &str) -> String {
    let mut lines: Vec<String> = raw
        .lines()
        .map(|line| QUOTE_PREFIX_RE.replace(line, "").trim_end().to_owned())
        .collect();

    let citation = lines.last().and_then(|last| {
        let caps = CITATION_RE.captures(last)?;
        Some((caps.get(0)?.start(), caps.name("cite")?.as_str().to_owned()))
    });
    if let Some((start, _)) = citation
        && let Some(last) = lines.last_mut()
    {
        last.truncate(start);
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut html = format!("<figure><blockquote>{}</blockquote>", lines.join("\n").trim());
    if let Some((_, cite)) = citation {
        let _ = write!(html, "<figcaption><cite>- {cite}</cite></figcaption>");
    }
    html.push_str("</figure>");
    html
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use shml_engine::{Engine, RenderOutput};

    use super::*;
    use crate::inline::inline_rules;

    fn render(text: &str) -> RenderOutput {
        let engine = Engine::new().unwrap();
        let inline = inline_rules(&BTreeMap::new()).unwrap();
        let rules =
            document_rules(engine.sentinels(), &inline, Some(Highlighter::new().unwrap())).unwrap();
        engine.render_document(text, &rules, BTreeMap::new()).unwrap()
    }

    fn html(text: &str) -> String {
        render(text).html
    }

    #[test]
    fn test_rule_order() {
        let engine = Engine::new().unwrap();
        let inline = inline_rules(&BTreeMap::new()).unwrap();
        let rules = document_rules(engine.sentinels(), &inline, None).unwrap();
        let names: Vec<&str> = rules.names().collect();

        assert_eq!(names[0], "code_block");
        assert_eq!(names.last(), Some(&"paragraph"));
        assert_eq!(rules.len(), inline.len() + 13);
        assert!(rules.position("image") < rules.position("strong"));
        assert!(rules.position("html") < rules.position("text_align"));
    }

    #[test]
    fn test_heading_with_anchor() {
        let output = render("# Title\n");
        let id = format!("h1:{}", Fingerprint::of_text("Title").to_hex());
        assert_eq!(id, "h1:6ccdecefd558c355");
        assert_eq!(
            output.html,
            format!(r##"<h1 id="{id}"><a href="#{id}" title="Link to section">Title</a></h1>"##)
                + "\n"
        );
        assert!(output.ids.contains(&id));
        assert_eq!(output.toc, vec![TocEntry { level: 1, title: "Title".to_owned(), id }]);
    }

    #[test]
    fn test_heading_explicit_id_and_duplicates() {
        let output = render("##[usage] Usage\n##[usage] **Usage**");
        assert_eq!(
            output.ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["h2:usage", "h2:usage-1"]
        );
        assert_eq!(output.toc[1].title, "<strong>Usage</strong>");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(html("one\ntwo\n\nthree"), "<p>one\ntwo</p>\n\n<p>three</p>");
        assert_eq!(html("Hello **World**!"), "<p>Hello <strong>World</strong>!</p>");
    }

    #[test]
    fn test_two_trailing_spaces_end_paragraph() {
        assert_eq!(html("a  \nb"), "<p>a</p>\n<p>b</p>");
        assert_eq!(html("a\nb  \nc\nd"), "<p>a\nb</p>\n<p>c\nd</p>");
        assert_eq!(html("a \nb"), "<p>a \nb</p>");
    }

    #[test]
    fn test_trailing_backslash_is_kept() {
        assert_eq!(html("\\"), "<p>\\</p>");
        assert_eq!(html("a\\"), "<p>a\\</p>");
    }

    #[test]
    fn test_properties_and_templates() {
        let output = render("title: First\ntitle: Second\nSee ${title} and ${missing}.\n");
        assert_eq!(output.properties.get("title").map(String::as_str), Some("First"));
        assert_eq!(output.html, "\n\n<p>See First and ${missing}.</p>\n");
    }

    #[test]
    fn test_property_ignores_urls_and_emphasis() {
        let output = render("https://example.com\n**Note:** careful");
        assert!(output.properties.is_empty());
        assert!(output.html.contains("<strong>Note:</strong> careful"));
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            html("+ one\n+ **two**"),
            "<ul>\n<li>one</li>\n<li><strong>two</strong></li>\n</ul>"
        );
        assert_eq!(html("1. a\n2) b\n"), "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
    }

    #[test]
    fn test_blockquote_with_citation() {
        assert_eq!(
            html(">>> To be or not to be\n>>> - Hamlet"),
            concat!(
                "<figure><blockquote>To be or not to be</blockquote>",
                "<figcaption><cite>- Hamlet</cite></figcaption></figure>",
            )
        );
        assert_eq!(html(">>> just this"), "<figure><blockquote>just this</blockquote></figure>");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            html("[[\nPets\nName, Legs\nCat, 4\n]]"),
            "<table>\n<caption>Pets</caption>\n\
             <thead>\n<tr><th>Name</th><th>Legs</th></tr>\n</thead>\n\
             <tbody>\n<tr><td>Cat</td><td>4</td></tr>\n</tbody>\n</table>"
        );
    }

    #[test]
    fn test_hr_and_block_html() {
        assert_eq!(html("a\n---\nb"), "<p>a</p>\n<hr>\n<p>b</p>");
        assert_eq!(html("<h2>x</h2>"), "<h2>x</h2>");
    }

    #[test]
    fn test_code_block_stays_literal() {
        assert_eq!(
            html("```\n**a** <b> \\*\n```"),
            "<pre><code>**a** &lt;b&gt; \\*</code></pre>"
        );
    }

    #[test]
    fn test_code_block_highlighting() {
        assert_eq!(
            html("```rust\nfn main() {}\n```"),
            r#"<pre><code class="language-rust"><span class="hl-keyword">fn</span> main() {}</code></pre>"#
        );
        assert_eq!(
            html("```cobol\nMOVE A\n```"),
            r#"<pre><code class="language-cobol">MOVE A</code></pre>"#
        );
    }

    #[test]
    fn test_text_align() {
        assert_eq!(
            html("@@ centered\nHello\n\nWorld\n@@ reset\nafter"),
            "<div style=\"text-align: center;\"><p>Hello</p>\n\n<p>World</p></div>\n<p>after</p>"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            html("![cat.png 100x50](A *cat*)"),
            r#"<p><img src="cat.png" alt="A *cat*" height="100" width="50"></p>"#
        );
        assert_eq!(html("![dog.png 80]"), r#"<p><img src="dog.png" height="80" width="80"></p>"#);
    }

    #[test]
    fn test_comments_and_raw() {
        assert_eq!(html("<!!-- note -->\ntext"), "<p>text</p>");
        assert_eq!(html("<</# not a heading/>>"), "<p># not a heading</p>");
    }
}
