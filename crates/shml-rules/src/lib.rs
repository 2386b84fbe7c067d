//! Built-in SHML rule sets.
//!
//! - [`inline_rules`]: emphasis, links, symbols, custom tokens and the other
//!   single-line constructs.
//! - [`document_rules`]: properties, templates, headings, lists, tables and
//!   paragraphs, followed by the inline rules.
//! - [`Highlighter`]: per-language token rules for fenced code blocks.
//!
//! [`Renderer`] bundles all of them behind one engine.

mod document;
mod highlight;
mod inline;
mod renderer;
mod symbols;
mod util;

pub use document::document_rules;
pub use highlight::{Highlighter, LANGUAGES, Language};
pub use inline::inline_rules;
pub use renderer::{Renderer, RuleOptions};
pub use symbols::{accent, shortcut, symbol};
pub use util::is_safe_href;
