//! Dynamically typed telemetry values returned by name resolution.

use serde::Serialize;
use std::fmt;

/// A single telemetry value.
///
/// Scalars cover the normalized sample and the producer's numeric fields; the
/// array variants mirror the fixed-size buffers of the shared-memory layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Float(f32),
    Double(f64),
    Integer(i32),
    Unsigned(u32),
    TextLines(Vec<String>),
    Bytes(Vec<u8>),
    FloatArray(Vec<f32>),
    IntegerArray(Vec<i32>),
    UnsignedArray(Vec<u32>),
}

impl TelemetryValue {
    /// Scalar view of the value, if it has one.
    ///
    /// Motion consumers only ever want a float; integer fields are widened and
    /// arrays or text have no scalar view.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Double(v) => Some(*v as f32),
            Self::Integer(v) => Some(*v as f32),
            Self::Unsigned(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Float(_) | Self::Double(_) | Self::Integer(_) | Self::Unsigned(_)
        )
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::TextLines(lines) => write!(f, "{}", lines.join(" | ")),
            Self::Bytes(bytes) => write!(f, "[{} bytes]", bytes.len()),
            Self::FloatArray(values) => write_list(f, values),
            Self::IntegerArray(values) => write_list(f, values),
            Self::UnsignedArray(values) => write_list(f, values),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

/// A resolved `(name, value)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: TelemetryValue,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: TelemetryValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.value.as_f32()
    }
}

impl fmt::Display for NamedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}
