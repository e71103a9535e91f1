//! Encoding and conversion constant summary

use anyhow::{Context, Result};
use console::style;
use serde_json::json;
use tinytensor_common::Encoding;
use tinytensor_quantization::utils::compression_ratio;
use tinytensor_quantization::{HALF16_SCALE, INT8_SCALE};

use crate::config::CliConfig;
use crate::output::OutputFormat;

/// Show supported encodings and scales
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoCommand;

impl InfoCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        match config.output.format {
            OutputFormat::Json => {
                let encodings: Vec<_> = Encoding::ALL
                    .iter()
                    .map(|&e| {
                        json!({
                            "name": e.name(),
                            "description": e.description(),
                            "byte_width": e.byte_width(),
                            "ratio_vs_f32": compression_ratio(Encoding::Full32, e),
                        })
                    })
                    .collect();
                let output = json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "half16_scale": HALF16_SCALE,
                    "int8_scale": INT8_SCALE,
                    "half16_overflow": config.quantization.half16_overflow.to_string(),
                    "encodings": encodings,
                });
                let text = serde_json::to_string_pretty(&output)
                    .context("Failed to serialize info")?;
                println!("{text}");
            }
            OutputFormat::Text => {
                println!("{}", style("tinytensor").bold().cyan());
                println!("  Version: {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("{}", style("Encodings:").bold());
                for e in Encoding::ALL {
                    println!(
                        "  {:<8} {} byte(s)  {:.0}x vs Float32  {}",
                        e.name(),
                        e.byte_width(),
                        compression_ratio(Encoding::Full32, e),
                        style(e.description()).dim()
                    );
                }
                println!();
                println!("{}", style("Conversion:").bold());
                println!("  Float16 scale : {HALF16_SCALE}");
                println!("  Int8 scale    : {INT8_SCALE}");
                println!("  Float16 overflow policy: {}", config.quantization.half16_overflow);
            }
        }
        Ok(())
    }
}
