//! Technical report rendering
//!
//! A report is a projection of one store: label, encoding, shape, byte
//! footprint and the row-major grid. Float cells print as `%7.2f`, integer
//! cells as `%7d`.

use serde::Serialize;
use std::fmt::Write;
use tinytensor_common::{Encoding, Scalar, TensorStore};

pub const BANNER: &str = "--- TINYML DYNAMIC TENSOR AND MATRIX MANAGEMENT ---";

/// Reconstruction quality of a converted matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionStats {
    /// Bytes of Float32 per byte of this encoding.
    pub compression_ratio: f32,
    pub mse: f32,
    pub snr_db: f32,
    /// Cells clamped to a range bound.
    pub saturated: usize,
    /// Half-precision cells that did not fit 16 bits.
    pub overflows: usize,
}

/// Everything printed for one matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixReport {
    pub label: String,
    pub encoding: Encoding,
    pub description: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub elements: usize,
    pub bytes: usize,
    pub cells: Vec<Vec<Scalar>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ConversionStats>,
}

impl MatrixReport {
    pub fn from_store(label: impl Into<String>, store: &TensorStore) -> Self {
        let encoding = store.encoding();
        Self {
            label: label.into(),
            encoding,
            description: encoding.description(),
            rows: store.rows(),
            cols: store.cols(),
            elements: store.len(),
            bytes: store.len() * encoding.byte_width(),
            cells: store.to_rows(),
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: ConversionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Render this report, ending with an empty line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // fmt::Write on String cannot fail
        let _ = writeln!(out, ">> [{}] REPORT", self.label);
        let _ = writeln!(out, "   - Data type    : {}", self.description);
        let _ = writeln!(
            out,
            "   - Matrix size  : {}x{} ({} eleman)",
            self.rows, self.cols, self.elements
        );
        let _ = writeln!(out, "   - Total memory : {} bytes", self.bytes);
        let _ = writeln!(out, "   - Matrix view:");
        for row in &self.cells {
            out.push_str("       [ ");
            for cell in row {
                let _ = write!(out, "{:7.2} ", cell);
            }
            out.push_str("]\n");
        }
        if let Some(stats) = &self.stats {
            let _ = writeln!(
                out,
                "   - Compression  : {:.2}x vs {}",
                stats.compression_ratio,
                Encoding::Full32
            );
            let _ = writeln!(out, "   - MSE          : {:.6}", stats.mse);
            let _ = writeln!(out, "   - SNR          : {:.2} dB", stats.snr_db);
            let _ = writeln!(out, "   - Saturated    : {} cells", stats.saturated);
            if stats.overflows > 0 {
                let _ = writeln!(out, "   - Overflowed   : {} cells", stats.overflows);
            }
        }
        out.push('\n');
        out
    }
}

/// Banner followed by every report.
pub fn render_text(reports: &[MatrixReport]) -> String {
    let mut out = format!("{BANNER}\n\n");
    for report in reports {
        out.push_str(&report.render());
    }
    out
}

pub fn render_json(reports: &[MatrixReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
