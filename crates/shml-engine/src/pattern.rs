//! Text patterns with optional match guards.
//!
//! A [`TextPattern`] is a compiled regular expression with named captures.
//! The `regex` crate guarantees linear-time matching and therefore offers no
//! look-around. Context conditions such as "preceded by a line break" or
//! "followed by a non-space" are expressed with a guard closure instead: the
//! guard sees each candidate match together with its surroundings and may
//! reject it, in which case the search resumes one character past the
//! candidate's start.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};

/// Guard deciding whether a candidate match is accepted.
pub type GuardFn = dyn Fn(&MatchContext<'_>) -> bool + Send + Sync;

/// Whether a capture name designates a recursive capture.
///
/// Recursive captures are named entirely in upper case (`TEXT`, `BODY_2`).
pub fn is_recursive_capture(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase)
}

/// Compiled pattern with named captures.
#[derive(Clone)]
pub struct TextPattern {
    regex: Regex,
    guard: Option<Arc<GuardFn>>,
}

impl TextPattern {
    /// Compile `source`.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self::from_regex)
    }

    /// Wrap an already compiled regex.
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex, guard: None }
    }

    /// Attach a guard. Candidates for which it returns `false` are skipped.
    #[must_use]
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&MatchContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the regex can produce an empty match anywhere in a text.
    ///
    /// Decided from the minimum match length of the parsed pattern, so
    /// context-dependent empty matches such as `\b[a-z]*` count too.
    pub fn matches_empty(&self) -> bool {
        regex_syntax::parse(self.regex.as_str()).map_or_else(
            |_| self.regex.is_match(""),
            |hir| hir.properties().minimum_len() == Some(0),
        )
    }

    /// Names of all named captures, in pattern order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    /// Accepted, non-overlapping, non-empty matches, left to right.
    pub fn find_iter<'p, 'h>(&'p self, haystack: &'h str) -> Matches<'p, 'h> {
        Matches {
            pattern: self,
            haystack,
            pos: 0,
        }
    }

    fn accepts(&self, context: &MatchContext<'_>) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(context))
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPattern")
            .field("regex", &self.regex.as_str())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// A candidate match with access to the surrounding text.
pub struct MatchContext<'h> {
    haystack: &'h str,
    captures: Captures<'h>,
}

impl<'h> MatchContext<'h> {
    /// Byte offset of the match start.
    pub fn start(&self) -> usize {
        self.captures.get_match().start()
    }

    /// Byte offset one past the match end.
    pub fn end(&self) -> usize {
        self.captures.get_match().end()
    }

    /// The matched text.
    pub fn as_str(&self) -> &'h str {
        self.captures.get_match().as_str()
    }

    /// Character immediately before the match.
    pub fn before(&self) -> Option<char> {
        self.haystack[..self.start()].chars().next_back()
    }

    /// Character immediately after the match.
    pub fn after(&self) -> Option<char> {
        self.haystack[self.end()..].chars().next()
    }

    /// Value of a named capture, if it participated in the match.
    pub fn name(&self, name: &str) -> Option<&'h str> {
        self.captures.name(name).map(|m| m.as_str())
    }
}

/// Iterator returned by [`TextPattern::find_iter`].
pub struct Matches<'p, 'h> {
    pattern: &'p TextPattern,
    haystack: &'h str,
    pos: usize,
}

impl<'h> Iterator for Matches<'_, 'h> {
    type Item = MatchContext<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.haystack.len() {
            let captures = self.pattern.regex.captures_at(self.haystack, self.pos)?;
            let context = MatchContext {
                haystack: self.haystack,
                captures,
            };
            let (start, end) = (context.start(), context.end());

            if start == end {
                tracing::warn!(
                    pattern = self.pattern.as_str(),
                    offset = start,
                    "Skipping empty match"
                );
            } else if self.pattern.accepts(&context) {
                self.pos = end;
                return Some(context);
            }

            self.pos = start + self.haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pattern: &TextPattern, text: &str) -> Vec<String> {
        pattern
            .find_iter(text)
            .map(|m| m.as_str().to_owned())
            .collect()
    }

    #[test]
    fn test_recursive_capture_names() {
        assert!(is_recursive_capture("TEXT"));
        assert!(is_recursive_capture("BODY_2"));
        assert!(!is_recursive_capture("text"));
        assert!(!is_recursive_capture("Text"));
        assert!(!is_recursive_capture("_1"));
    }

    #[test]
    fn test_find_iter_without_guard() {
        let pattern = TextPattern::new(r"\*\*(?P<TEXT>.*?)\*\*").unwrap();
        assert_eq!(spans(&pattern, "**a** and **b**"), vec!["**a**", "**b**"]);
    }

    #[test]
    fn test_guard_rejects_and_resumes() {
        // Only dashes surrounded by non-space characters.
        let pattern = TextPattern::new("-/-").unwrap().with_guard(|m| {
            m.before().is_some_and(|c| !c.is_whitespace())
                && m.after().is_some_and(|c| !c.is_whitespace())
        });
        let found: Vec<usize> = pattern.find_iter("a -/- b-/-c -/-").map(|m| m.start()).collect();
        assert_eq!(found, vec![7]);
    }

    #[test]
    fn test_guard_sees_captures() {
        let pattern = TextPattern::new(r"(?P<key>[a-z]+):")
            .unwrap()
            .with_guard(|m| {
                m.name("key") != Some("http") && !m.before().is_some_and(char::is_alphanumeric)
            });
        assert_eq!(spans(&pattern, "http: title:"), vec!["title:"]);
    }

    #[test]
    fn test_rejected_match_retries_inside_span() {
        // The guard refuses the match starting at 0, a later start still succeeds.
        let pattern = TextPattern::new("a+b").unwrap().with_guard(|m| m.start() > 0);
        assert_eq!(spans(&pattern, "aaab"), vec!["aab"]);
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let pattern = TextPattern::new(r"x*").unwrap();
        assert!(pattern.matches_empty());
        assert_eq!(spans(&pattern, "axxbx"), vec!["xx", "x"]);
    }

    #[test]
    fn test_multibyte_haystack() {
        let pattern = TextPattern::new("é").unwrap().with_guard(|m| m.before() != Some('ü'));
        assert_eq!(spans(&pattern, "üéaé"), vec!["é"]);
        let starts: Vec<usize> = pattern.find_iter("üéaé").map(|m| m.start()).collect();
        assert_eq!(starts, vec![5]);
    }
}
