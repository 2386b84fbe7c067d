//! `shml render` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use shml_config::{CliSettings, Config, RenderMode};
use shml_engine::{RenderOutput, SessionState};
use shml_rules::Renderer;

use super::rule_options;
use crate::error::CliError;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Input file (default: stdin).
    file: Option<PathBuf>,

    /// Render with the inline rules only (overrides config).
    #[arg(long)]
    inline: bool,

    /// Path to configuration file (default: auto-discover shml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable syntax highlighting of fenced code.
    #[arg(long)]
    no_highlight: bool,

    /// Write HTML, properties, ids and outline as JSON.
    #[arg(long)]
    properties: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, rendering or output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            mode: self.inline.then_some(RenderMode::Inline),
            highlight: self.no_highlight.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let renderer = Renderer::new(&rule_options(&config))?;
        let input = read_input(self.file.as_deref())?;
        let output = match config.render.mode {
            RenderMode::Document => renderer.render_document(&input, config.properties.clone())?,
            RenderMode::Inline => SessionState::new().into_output(renderer.render_inline(&input)?),
        };
        tracing::info!(
            mode = ?config.render.mode,
            bytes = output.html.len(),
            headings = output.toc.len(),
            "Rendered"
        );

        let mut stdout = io::stdout().lock();
        write_output(&mut stdout, &output, self.properties)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Read the whole input file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn write_output(
    out: &mut impl Write,
    output: &RenderOutput,
    as_json: bool,
) -> Result<(), CliError> {
    if as_json {
        serde_json::to_writer_pretty(&mut *out, output)?;
        writeln!(out)?;
    } else {
        out.write_all(output.html.as_bytes())?;
    }
    Ok(())
}
