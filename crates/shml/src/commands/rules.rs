//! `shml rules` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use shml_config::Config;
use shml_engine::RuleSet;
use shml_rules::Renderer;

use super::rule_options;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rules command.
#[derive(Args)]
pub(crate) struct RulesArgs {
    /// List the inline rules instead of the document rules.
    #[arg(long)]
    inline: bool,

    /// Path to configuration file (default: auto-discover shml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RulesArgs {
    /// Execute the rules command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a rule cannot be built.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let renderer = Renderer::new(&rule_options(&config))?;

        let (label, rules) = if self.inline {
            ("Inline", renderer.inline_rules())
        } else {
            ("Document", renderer.document_rules())
        };
        output.highlight(&format!("{label} rules"));

        let mut stdout = io::stdout().lock();
        write_rules(&mut stdout, rules)?;
        stdout.flush()?;

        output.info(&format!("{} rules", rules.len()));
        Ok(())
    }
}

fn write_rules(out: &mut impl Write, rules: &RuleSet) -> io::Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        writeln!(out, "{:>3}  {:<18}{}", index + 1, rule.name(), rule.scope())?;
    }
    Ok(())
}
