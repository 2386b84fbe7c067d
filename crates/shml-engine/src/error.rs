//! Engine error types.

/// Reason a rule was refused at registration.
#[derive(Debug, thiserror::Error)]
pub enum RuleDefect {
    /// The pattern matches the empty string, so extraction could not make progress.
    #[error("pattern can match the empty string")]
    MatchesEmpty,
    /// Another rule with the same name is already registered.
    #[error("a rule with this name is already registered")]
    DuplicateName,
    /// The pattern source is not a valid regular expression.
    #[error("pattern does not compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Error returned by the engine.
///
/// Every variant aborts the render call that produced it; no partial output
/// is ever returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input already contains a reserved marker code point.
    #[error("input contains reserved marker {marker:?} at byte offset {position}")]
    ContaminatedInput {
        /// Byte offset of the first reserved marker.
        position: usize,
        /// The offending code point.
        marker: char,
    },
    /// A rule was refused by the registry.
    #[error("invalid rule `{name}`: {reason}")]
    InvalidRule {
        /// Name of the refused rule.
        name: String,
        /// Why it was refused.
        #[source]
        reason: RuleDefect,
    },
    /// The sentinel pool ran out of reserved markers.
    #[error("sentinel pool exhausted after {drawn} markers")]
    PoolExhausted {
        /// Number of markers handed out before exhaustion.
        drawn: usize,
    },
    /// A placeholder has no block in the block table.
    #[error("no block registered for placeholder {placeholder:?}")]
    UnresolvedBlock {
        /// The placeholder text (including sentinel markers).
        placeholder: String,
    },
    /// A render function emitted a placeholder that is still being resolved.
    #[error("block of rule `{rule}` expands into itself")]
    CyclicBlock {
        /// Rule whose block re-entered itself.
        rule: String,
    },
    /// A render function failed.
    #[error("render function failed: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wrap a rule author's error for return from a render function.
    pub fn render(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Render(error.into())
    }

    pub(crate) fn invalid_rule(name: &str, reason: impl Into<RuleDefect>) -> Self {
        Self::InvalidRule {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contaminated_input_escapes_marker() {
        let err = EngineError::ContaminatedInput {
            position: 3,
            marker: '\u{FFFE}',
        };
        let message = err.to_string();
        assert!(message.contains("\\u{fffe}"), "{message}");
        assert!(message.contains("byte offset 3"));
    }

    #[test]
    fn test_invalid_rule_mentions_name_and_reason() {
        let err = EngineError::invalid_rule("strong", RuleDefect::DuplicateName);
        assert_eq!(
            err.to_string(),
            "invalid rule `strong`: a rule with this name is already registered"
        );
    }

    #[test]
    fn test_render_wraps_string_errors() {
        let err = EngineError::render("bad table row");
        assert_eq!(err.to_string(), "render function failed: bad table row");
    }
}
