//! Element encodings and tagged cell values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element representation of a matrix.
///
/// # Memory Usage
/// - `Full32`: 4 bytes per value
/// - `Half16`: 2 bytes per value (scaled fixed point, not IEEE binary16)
/// - `Quantized8`: 1 byte per value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    /// 32-bit floating point.
    Full32,
    /// 16-bit signed integer holding `value * 1000`.
    Half16,
    /// 8-bit signed integer in `[-128, 127]`.
    Quantized8,
}

impl Encoding {
    /// All encodings, widest first.
    pub const ALL: [Encoding; 3] = [Encoding::Full32, Encoding::Half16, Encoding::Quantized8];

    /// Number of bytes used by one element.
    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Full32 => 4,
            Self::Half16 => 2,
            Self::Quantized8 => 1,
        }
    }

    /// Short canonical name, also accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Full32 => "Float32",
            Self::Half16 => "Float16",
            Self::Quantized8 => "Int8",
        }
    }

    /// Human-readable description used in technical reports.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Full32 => "Float32",
            Self::Half16 => "Float16 (simulated int16)",
            Self::Quantized8 => "Int8 (quantized)",
        }
    }

    /// Whether cells of this encoding are integers.
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Full32)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32" | "f32" | "full32" => Ok(Self::Full32),
            "float16" | "f16" | "half16" => Ok(Self::Half16),
            "int8" | "i8" | "quantized8" => Ok(Self::Quantized8),
            other => Err(format!(
                "unknown encoding '{other}'. Expected one of: float32, float16, int8"
            )),
        }
    }
}

/// What a half-precision conversion stores when `value * 1000` leaves the
/// 16-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Clamp to `[-32768, 32767]`.
    #[default]
    Saturate,
    /// Native integer narrowing: truncate to 32 bits, keep the low 16.
    Wrap,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saturate => f.write_str("saturate"),
            Self::Wrap => f.write_str("wrap"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "saturate" | "clamp" => Ok(Self::Saturate),
            "wrap" => Ok(Self::Wrap),
            other => Err(format!("unknown overflow policy '{other}'. Expected one of: saturate, wrap")),
        }
    }
}

/// A single cell value tagged with its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    F32(f32),
    I16(i16),
    I8(i8),
}

impl Scalar {
    /// Encoding this value belongs to.
    pub const fn encoding(self) -> Encoding {
        match self {
            Self::F32(_) => Encoding::Full32,
            Self::I16(_) => Encoding::Half16,
            Self::I8(_) => Encoding::Quantized8,
        }
    }

    /// Widen to `f64` for display or metrics.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::F32(v) => f64::from(v),
            Self::I16(v) => f64::from(v),
            Self::I8(v) => f64::from(v),
        }
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::F32(value)
    }
}

impl From<i16> for Scalar {
    fn from(value: i16) -> Self {
        Self::I16(value)
    }
}

impl From<i8> for Scalar {
    fn from(value: i8) -> Self {
        Self::I8(value)
    }
}

/// Formats with the report's fixed-width fields: floats honour precision,
/// integers ignore it.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(0);
        match self {
            Self::F32(v) => match f.precision() {
                Some(p) => write!(f, "{v:>width$.p$}"),
                None => write!(f, "{v:>width$}"),
            },
            Self::I16(v) => write!(f, "{v:>width$}"),
            Self::I8(v) => write!(f, "{v:>width$}"),
        }
    }
}
