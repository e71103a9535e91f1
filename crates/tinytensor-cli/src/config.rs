//! CLI configuration: defaults, TOML file, command-line overrides

use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tinytensor_common::{OverflowPolicy, Result, TinyTensorError};

/// Rows of the built-in sensor dataset.
pub const DEMO_ROWS: usize = 2;
/// Columns of the built-in sensor dataset.
pub const DEMO_COLS: usize = 3;
/// Built-in 2x3 sensor/weight matrix, row-major.
pub const DEMO_DATA: [f32; DEMO_ROWS * DEMO_COLS] = [0.15, -0.88, 1.20, -0.05, 0.50, 0.95];

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Main CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    pub matrix: MatrixConfig,
    pub quantization: QuantizationSettings,
    pub logging: LoggingConfig,
    pub output: OutputSettings,
}

/// Source matrix for the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub rows: usize,
    pub cols: usize,
    /// Row-major values, `rows * cols` long.
    pub data: Vec<f32>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self { rows: DEMO_ROWS, cols: DEMO_COLS, data: DEMO_DATA.to_vec() }
    }
}

/// Conversion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuantizationSettings {
    pub half16_overflow: OverflowPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "compact".to_string() }
    }
}

/// Report output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

impl CliConfig {
    pub const DEFAULT_FILE: &'static str = "tinytensor.toml";

    /// `./tinytensor.toml`
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(Self::DEFAULT_FILE)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TinyTensorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TinyTensorError::Config(format!("invalid TOML: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let m = &self.matrix;
        if m.rows == 0 || m.cols == 0 {
            return Err(TinyTensorError::Config(format!(
                "matrix.rows and matrix.cols must be non-zero, got {}x{}",
                m.rows, m.cols
            )));
        }
        let expected = m.rows.checked_mul(m.cols).ok_or_else(|| {
            TinyTensorError::Config(format!("matrix {}x{} is too large", m.rows, m.cols))
        })?;
        if m.data.len() != expected {
            return Err(TinyTensorError::Config(format!(
                "matrix.data has {} values but {}x{} needs {}",
                m.data.len(),
                m.rows,
                m.cols,
                expected
            )));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(TinyTensorError::Config(format!(
                "unknown logging.level '{}'. Expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(TinyTensorError::Config(format!(
                "unknown logging.format '{}'. Expected one of: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Layers command-line overrides on top of defaults or a file.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: CliConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self { config: CliConfig::from_file(path)? })
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.config.logging.level = level;
        }
        self
    }

    pub fn log_format(mut self, format: Option<String>) -> Self {
        if let Some(format) = format {
            self.config.logging.format = format;
        }
        self
    }

    pub fn output_format(mut self, format: Option<OutputFormat>) -> Self {
        if let Some(format) = format {
            self.config.output.format = format;
        }
        self
    }

    pub fn half16_overflow(mut self, policy: Option<OverflowPolicy>) -> Self {
        if let Some(policy) = policy {
            self.config.quantization.half16_overflow = policy;
        }
        self
    }

    pub fn matrix(mut self, rows: usize, cols: usize, data: Vec<f32>) -> Self {
        self.config.matrix = MatrixConfig { rows, cols, data };
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<CliConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
