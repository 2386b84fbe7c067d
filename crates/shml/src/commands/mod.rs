//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod rules;

pub(crate) use render::RenderArgs;
pub(crate) use rules::RulesArgs;

use shml_config::Config;
use shml_rules::RuleOptions;

/// Rule options taken from the loaded configuration.
fn rule_options(config: &Config) -> RuleOptions {
    RuleOptions {
        tokens: config.tokens.clone(),
        highlight: config.render.highlight,
    }
}
