//! Rendering options and configuration.

use crate::error::{Error, Result};

/// Options for rendering a [`Document`](crate::model::Document) to Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum heading level (1-6); deeper headings are clamped
    pub max_heading_level: u8,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters in text
    pub escape_special_chars: bool,

    /// Write the guessed language after the opening code fence
    pub code_language_hints: bool,

    /// Render page margin content as quote blocks
    pub include_notes: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable escaping of Markdown syntax characters.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable code fence language hints.
    pub fn with_code_language_hints(mut self, enabled: bool) -> Self {
        self.code_language_hints = enabled;
        self
    }

    /// Enable or disable rendering of page margin content.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Reject settings that would produce invalid Markdown.
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.max_heading_level) {
            return Err(Error::invalid_option(
                "max_heading_level",
                format!("must be between 1 and 6, got {}", self.max_heading_level),
            ));
        }
        if !matches!(self.list_marker, '-' | '*' | '+') {
            return Err(Error::invalid_option(
                "list_marker",
                format!("must be one of '-', '*' or '+', got {:?}", self.list_marker),
            ));
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            list_marker: '-',
            escape_special_chars: true,
            code_language_hints: false,
            include_notes: true,
        }
    }
}
