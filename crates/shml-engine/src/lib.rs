//! Placeholder-based markup rendering engine.
//!
//! Markup is rendered in two passes over HTML-escaped input:
//!
//! 1. **Extraction.** Each rule of a [`RuleSet`] runs in registration order
//!    and replaces its matches with placeholders: a fingerprint of the matched
//!    text spelled in reserved Unicode noncharacters. The matched data is
//!    stored in a [`BlockTable`]. Captures named in upper case are extracted
//!    again with a reduced rule set before their block is stored.
//! 2. **Decoding.** Placeholders are resolved left to right through each
//!    rule's render function until none remain.
//!
//! Rules are plain data: a name, a [`TextPattern`], a [`Scope`] and a render
//! closure. Built-in syntaxes and syntax highlighters are rule sets fed
//! through the same interface.
//!
//! # Example
//!
//! ```
//! use shml_engine::{Engine, Rule, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .with_rule(Rule::parse("strong", r"\*\*(?P<TEXT>[^*\n][^\n]*?)\*\*")?)?
//!     .with_rule(Rule::parse("em", r"\*(?P<TEXT>[^*\n][^\n]*?)\*")?)?;
//!
//! let engine = Engine::new()?;
//! let html = engine.render_inline("Hello **World** & *friends*", &rules)?;
//! assert_eq!(html, "Hello <strong>World</strong> &amp; <em>friends</em>");
//! # Ok::<(), shml_engine::EngineError>(())
//! ```
//!
//! # Render functions
//!
//! A render function receives the [`Block`] and a [`Decoder`]. Captures may
//! still hold placeholders; call [`Decoder::decode`] for the rendered form or
//! use the capture as-is for the literal text:
//!
//! ```
//! use shml_engine::{Engine, Rule, RuleSet};
//!
//! let code = Rule::parse("code", "`(?P<text>[^`\n]*)`")?.with_render(|block, _| {
//!     Ok(format!("<code>{}</code>", block.capture("text").unwrap_or_default()))
//! });
//! let rules = RuleSet::new().with_rule(code)?;
//!
//! let html = Engine::new()?.render_inline("`a < b`", &rules)?;
//! assert_eq!(html, "<code>a &lt; b</code>");
//! # Ok::<(), shml_engine::EngineError>(())
//! ```

mod block;
mod decode;
mod engine;
mod error;
mod extract;
mod fingerprint;
mod pattern;
mod rule;
mod sentinel;
mod state;

pub use block::{Block, BlockTable, TEXT_CAPTURE};
pub use decode::Decoder;
pub use engine::{Engine, escape_html};
pub use error::{EngineError, RuleDefect};
pub use extract::extract;
pub use fingerprint::Fingerprint;
pub use pattern::{GuardFn, MatchContext, Matches, TextPattern, is_recursive_capture};
pub use rule::{RenderFn, Rule, RuleSet, Scope};
pub use sentinel::{SentinelPool, Sentinels, is_noncharacter};
pub use state::{RenderOutput, SessionState, TocEntry};
