//! Helpers shared by the rule sets.

use shml_engine::{Block, MatchContext};

/// Replacement for link targets with an unsafe scheme.
pub(crate) const BLOCKED_HREF: &str = "about:blank#blocked";

/// Whether a link target may be emitted as-is.
///
/// Relative targets (no colon, or a slash before the first colon) and the
/// `http`, `https` and `mailto` schemes are allowed.
pub fn is_safe_href(href: &str) -> bool {
    let Some(colon) = href.find(':') else {
        return true;
    };
    let scheme = &href[..colon];
    scheme.contains('/')
        || ["http", "https", "mailto"]
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

/// `href` if safe, otherwise the blocked placeholder target.
pub(crate) fn sanitize_href(href: &str) -> &str {
    if is_safe_href(href) { href } else { BLOCKED_HREF }
}

/// Capture value or empty string.
pub(crate) fn capture<'b>(block: &'b Block, name: &str) -> &'b str {
    block.capture(name).unwrap_or_default()
}

/// Regex escape for a single character inside a character class.
pub(crate) fn class_char(c: char) -> String {
    format!(r"\x{{{:X}}}", u32::from(c))
}

/// Guard: the match begins a line.
pub(crate) fn starts_line(m: &MatchContext<'_>) -> bool {
    m.before() == Some('\n')
}

/// Guard: the match runs to the end of its line.
pub(crate) fn ends_line(m: &MatchContext<'_>) -> bool {
    m.after().is_none_or(|c| c == '\n')
}
