//! Data model: input tokens and the output document.
//!
//! Tokens come from the external text extractor; the [`Document`] is the
//! format-agnostic result of layout analysis that renderers consume.

mod document;
mod table;
mod token;

pub use document::{CodeBlock, Document, ListBlock, ListItem, Notes, Unit};
pub use table::{Table, TableCell, TableRow};
pub use token::{group_by_page, tokens_from_json, BBox, PageTokens, Token};
