//! # pdf2markdown
//!
//! Structure-aware conversion of positioned PDF text tokens to Markdown.
//!
//! A text extractor supplies tokens (text runs with bounding boxes, font
//! family and size); this library infers lines, columns, headings,
//! paragraphs, lists, tables and code blocks from geometry and typography
//! alone, and renders the result as Markdown.
//!
//! ## Quick Start
//!
//! ```
//! use pdf2markdown::{to_markdown, BBox, PageTokens, Token};
//!
//! fn main() -> pdf2markdown::Result<()> {
//!     let tokens = vec![
//!         Token::new("Title", BBox::new(72.0, 76.0, 132.0, 100.0), "Helvetica", 24.0),
//!         Token::new(
//!             "Body text follows the title.",
//!             BBox::new(72.0, 128.0, 240.0, 140.0),
//!             "Times",
//!             12.0,
//!         ),
//!     ];
//!     let markdown = to_markdown(vec![PageTokens::new(0, tokens)])?;
//!     assert_eq!(markdown, "# Title\n\nBody text follows the title.\n");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Headings** ranked by font size across the whole document
//! - **Multi-column** pages read column by column
//! - **Tables** rebuilt from aligned rows, demoted to paragraphs when ragged
//! - **Lists** with nesting from indentation
//! - **Code blocks** from monospace fonts, indentation preserved
//! - **Parallel processing**: uses Rayon for per-page stages
//! - **Streaming intake** through [`TokenSource`] with cancellation

pub mod convert;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use convert::{
    CancellationToken, ConvertOptions, ConvertResult, Converter, TokenSource,
};
pub use error::{Error, Result, Warning};
pub use layout::LayoutOptions;
pub use model::{
    group_by_page, tokens_from_json, BBox, CodeBlock, Document, ListBlock, ListItem, Notes,
    PageTokens, Table, TableCell, TableRow, Token, Unit,
};
pub use render::{ExtractionStats, JsonFormat, RenderOptions};

/// Convert pages of tokens to Markdown with default options.
///
/// # Example
///
/// ```
/// use pdf2markdown::to_markdown;
///
/// assert_eq!(to_markdown(vec![]).unwrap(), "");
/// ```
pub fn to_markdown(pages: Vec<PageTokens>) -> Result<String> {
    Ok(convert(pages)?.markdown)
}

/// Convert pages of tokens with default options, keeping the document,
/// statistics and warnings.
pub fn convert(pages: Vec<PageTokens>) -> Result<ConvertResult> {
    Converter::default().convert_pages(pages)
}

/// Convert a flat token stream, grouping tokens by page.
pub fn convert_tokens(tokens: Vec<Token>) -> Result<ConvertResult> {
    Converter::default().convert_tokens(tokens)
}

/// Convert a JSON token dump.
///
/// The dump is either an array of pages or a flat array of tokens; see
/// [`tokens_from_json`].
///
/// # Example
///
/// ```
/// use pdf2markdown::convert_json;
///
/// let json = r#"[{"text":"Hello","bbox":{"x0":72,"y0":100,"x1":102,"y1":112},
///                 "font_family":"Times","font_size":12}]"#;
/// let result = convert_json(json).unwrap();
/// assert_eq!(result.markdown, "Hello\n");
/// ```
pub fn convert_json(json: &str) -> Result<ConvertResult> {
    convert(tokens_from_json(json)?)
}

/// Builder for configuring and running a conversion.
///
/// # Example
///
/// ```
/// use pdf2markdown::Pdf2Markdown;
///
/// let result = Pdf2Markdown::new()
///     .with_heading_size_ratio(1.3)
///     .with_min_table_rows(3)
///     .with_code_language_hints(true)
///     .sequential()
///     .convert_pages(vec![])?;
/// assert!(result.markdown.is_empty());
/// # Ok::<(), pdf2markdown::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdf2Markdown {
    options: ConvertOptions,
}

impl Pdf2Markdown {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum ratio of a heading's size to the body size.
    pub fn with_heading_size_ratio(mut self, ratio: f32) -> Self {
        self.options.layout = self.options.layout.with_heading_size_ratio(ratio);
        self
    }

    /// Vertical gap, in median line heights, that separates blocks.
    pub fn with_block_gap_multiplier(mut self, k: f32) -> Self {
        self.options.layout = self.options.layout.with_block_gap_multiplier(k);
        self
    }

    /// Minimum number of rows for a table.
    pub fn with_min_table_rows(mut self, rows: usize) -> Self {
        self.options.layout = self.options.layout.with_min_table_rows(rows);
        self
    }

    /// Fix the indent step between list levels instead of inferring it.
    pub fn with_list_indent_unit(mut self, unit: f32) -> Self {
        self.options.layout = self.options.layout.with_list_indent_unit(unit);
        self
    }

    /// Height of the top and bottom page bands treated as margins.
    pub fn with_margin_band(mut self, band: f32) -> Self {
        self.options.layout = self.options.layout.with_margin_band(band);
        self
    }

    /// Write guessed languages after code fences.
    pub fn with_code_language_hints(mut self, enabled: bool) -> Self {
        self.options.render = self.options.render.with_code_language_hints(enabled);
        self
    }

    /// Replace the layout options.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.options.layout = options;
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options.render = options;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options.cancellation = Some(token);
        self
    }

    /// Validate the options and build a [`Converter`].
    pub fn build(self) -> Result<Converter> {
        Converter::new(self.options)
    }

    /// Convert pages of tokens.
    pub fn convert_pages(self, pages: Vec<PageTokens>) -> Result<ConvertResult> {
        self.build()?.convert_pages(pages)
    }

    /// Convert a JSON token dump.
    pub fn convert_json(self, json: &str) -> Result<ConvertResult> {
        let pages = tokens_from_json(json)?;
        self.build()?.convert_pages(pages)
    }

    /// Convert pages pulled from a token source.
    pub fn convert_source<S: TokenSource + Send>(self, source: S) -> Result<ConvertResult> {
        self.build()?.convert_source(source)
    }
}
