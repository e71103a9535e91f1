//! tinytensor CLI application
//!
//! Prints a technical report of one matrix held as Float32, simulated
//! Float16 and quantized Int8.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tinytensor_common::OverflowPolicy;
use tracing::{debug, error};

use tinytensor_cli::commands::{InfoCommand, ReportCommand};
use tinytensor_cli::config::{CliConfig, ConfigBuilder};
use tinytensor_cli::exit::{EXIT_SUCCESS, exit_code_for};
use tinytensor_cli::output::OutputFormat;

/// tinytensor - dynamic tensor storage and quantization report
#[derive(Parser)]
#[command(name = "tinytensor")]
#[command(about = "Dynamic tensor storage with Float16 and Int8 quantization")]
#[command(long_about = r#"
tinytensor allocates a matrix in full precision, converts it to a simulated
half-precision (value * 1000 as int16) and a quantized int8 (value * 127,
saturated) copy, and prints a technical report for each.

Examples:
  # Report for the built-in sensor matrix
  tinytensor

  # Include compression ratio, MSE and SNR
  tinytensor report --stats

  # Machine-readable output with a custom matrix
  tinytensor --config weights.toml --format json
"#)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Float16 overflow policy (saturate, wrap)
    #[arg(long, value_name = "POLICY", global = true)]
    half16_overflow: Option<OverflowPolicy>,

    /// Append conversion statistics to the report
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the technical report (default)
    Report(ReportCommand),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show supported encodings and conversion scales
    Info,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration as TOML
    Show,
    /// Show configuration file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report_error(&e);
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let path = config_path(&cli);
    let config = load_configuration(&cli)?;
    setup_logging(&config)?;

    match cli.command {
        Some(Commands::Report(mut cmd)) => {
            cmd.stats |= cli.stats;
            cmd.execute(&config)
        }
        Some(Commands::Config { action }) => handle_config_command(action, &path, &config),
        Some(Commands::Info) => InfoCommand.execute(&config),
        None => ReportCommand { stats: cli.stats }.execute(&config),
    }
}

/// Print the error and every cause to stderr.
fn report_error(e: &anyhow::Error) {
    error!("Command failed: {}", e);
    eprintln!("Error: {e}");
    for cause in e.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(CliConfig::default_config_path)
}

/// Load configuration from file and merge with CLI arguments
fn load_configuration(cli: &Cli) -> Result<CliConfig> {
    let path = config_path(cli);
    let builder = if cli.config.is_some() || path.exists() {
        ConfigBuilder::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else {
        ConfigBuilder::new()
    };

    builder
        .log_level(cli.log_level.clone())
        .log_format(cli.log_format.clone())
        .output_format(cli.format)
        .half16_overflow(cli.half16_overflow)
        .build()
        .context("Failed to build configuration")
}

/// Setup logging based on configuration
fn setup_logging(config: &CliConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed; keep the existing one.
    let _ = match config.logging.format.as_str() {
        "json" => subscriber.json().try_init(),
        "compact" => subscriber.compact().try_init(),
        _ => subscriber.pretty().try_init(),
    };

    debug!(level = %config.logging.level, format = %config.logging.format, "logging ready");
    Ok(())
}

/// Handle configuration commands
fn handle_config_command(action: ConfigAction, path: &Path, config: &CliConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let text =
                toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            print!("{text}");
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
