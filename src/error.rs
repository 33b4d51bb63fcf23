//! Structured error types for datasweep.
//!
//! Reader/writer failures wrap the underlying crate errors. Layout contract
//! violations and canvas failures get their own variants so callers can tell
//! a bad input file from a programming error.

use thiserror::Error;

/// The unified error type returned by all public datasweep functions.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// JSON input (table or render options) failed to parse.
    #[error("Failed to parse JSON: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A row or table violated the layout contract (caller bug).
    #[error("Layout error: {0}")]
    Layout(String),

    /// Drawing or serialization on the canvas failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The input data does not form a valid table.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot convert {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// An external document converter failed or is missing.
    #[error("Converter error: {0}")]
    Converter(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        SweepError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_carry_a_hint() {
        let err: SweepError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse JSON"));
        assert!(msg.contains("trailing commas"), "got: {msg}");
    }

    #[test]
    fn test_eof_hint_mentions_truncation() {
        let err: SweepError = serde_json::from_str::<serde_json::Value>("{ \"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }
}
