//! Error and warning types for pdf2markdown.

use std::io;
use thiserror::Error;

/// Result type alias for pdf2markdown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that stop a conversion.
///
/// Irregular layouts never produce an `Error`: ambiguous blocks fall back to
/// paragraphs and unreconcilable tables are demoted. See [`Warning`] for the
/// non-fatal signals reported alongside a successful conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading a token dump or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration value is out of range.
    #[error("Invalid option `{name}`: {reason}")]
    InvalidOption {
        /// Option name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The caller cancelled the conversion before it finished.
    #[error("Conversion cancelled")]
    Cancelled,

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The external token source failed to yield a page.
    #[error("Token source error on page {page}: {message}")]
    TokenSource {
        /// Page index being read
        page: usize,
        /// Message from the source
        message: String,
    },

    /// Error during rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build an [`Error::InvalidOption`].
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// Non-fatal conditions collected during a conversion.
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Tokens with a degenerate bounding box were skipped.
    #[error("page {}: skipped {count} malformed token(s)", .page + 1)]
    MalformedTokens {
        /// Page index
        page: usize,
        /// Number of skipped tokens
        count: usize,
    },

    /// A run of table-like rows could not be reconciled into a grid and was
    /// emitted as paragraphs.
    #[error("page {}: {rows} table row(s) demoted to paragraphs ({reason})", .page + 1)]
    TableReconciliationFailure {
        /// Page index
        page: usize,
        /// Number of rows demoted
        rows: usize,
        /// Why the run was rejected
        reason: String,
    },
}
