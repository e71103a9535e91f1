//! Technical report command

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use tracing::info;

use crate::config::CliConfig;
use crate::output::OutputFormat;
use crate::pipeline::{self, PipelineOptions};
use crate::report::{render_json, render_text};

/// Print the Float32 / Float16 / Int8 technical report
#[derive(Debug, Clone, Default, Args)]
pub struct ReportCommand {
    /// Set from the global `--stats` flag.
    #[arg(skip)]
    pub stats: bool,
}

impl ReportCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let output = self.render(config)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes()).context("Failed to write report")?;
        stdout.flush().context("Failed to write report")?;
        Ok(())
    }

    /// Build the report in the configured output format.
    pub fn render(&self, config: &CliConfig) -> Result<String> {
        let options = PipelineOptions { stats: self.stats };
        let reports = pipeline::run(config, options).context("Failed to build report")?;
        info!(format = %config.output.format, "rendering report");

        match config.output.format {
            OutputFormat::Text => Ok(render_text(&reports)),
            OutputFormat::Json => {
                let mut json = render_json(&reports).context("Failed to serialize report")?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}
