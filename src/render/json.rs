//! JSON output for documents and conversion statistics.

use serde::Serialize;

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented, one field per line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Serialize a [`Document`](crate::Document), [`ExtractionStats`](crate::ExtractionStats)
/// or any other serializable value.
///
/// Units carry a `"type"` tag (`"heading"`, `"table"`, ...) so consumers can
/// dispatch without knowing Rust enum layout.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}
