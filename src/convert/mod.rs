//! Conversion pipeline from tokens to Markdown.
//!
//! The [`Converter`] runs the layout stages page by page, in parallel unless
//! [`ConvertOptions::sequential`] is requested, then resolves reading order
//! and renders the result.
//!
//! # Example
//!
//! ```
//! use pdf2markdown::convert::{ConvertOptions, Converter};
//! use pdf2markdown::model::{BBox, PageTokens, Token};
//!
//! fn main() -> pdf2markdown::Result<()> {
//!     let page = PageTokens::new(
//!         0,
//!         vec![Token::new("Hello", BBox::new(72.0, 100.0, 102.0, 112.0), "Times", 12.0)],
//!     );
//!     let converter = Converter::new(ConvertOptions::default())?;
//!     let result = converter.convert_pages(vec![page])?;
//!     assert_eq!(result.markdown, "Hello\n");
//!     Ok(())
//! }
//! ```

mod source;

pub use source::{CancellationToken, TokenSource};

use rayon::prelude::*;

use crate::error::{Error, Result, Warning};
use crate::layout::{
    analyze_page, layout_page, resolve, AnalyzedPage, DocumentStats, LayoutOptions, PageLayout,
};
use crate::model::{group_by_page, Document, PageTokens, Token};
use crate::render::{to_markdown, ExtractionStats, RenderOptions};

/// Options for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Layout analysis options
    pub layout: LayoutOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Run per-page stages on the rayon thread pool
    pub parallel: bool,

    /// Flag checked before each page stage
    pub cancellation: Option<CancellationToken>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that run every stage on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Set layout options.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Check all option values.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.render.validate()
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            render: RenderOptions::default(),
            parallel: true,
            cancellation: None,
        }
    }
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered Markdown
    pub markdown: String,

    /// The structured document the Markdown was rendered from
    pub document: Document,

    /// Conversion statistics
    pub stats: ExtractionStats,

    /// Non-fatal problems, ordered by page
    pub warnings: Vec<Warning>,
}

impl ConvertResult {
    /// Whether any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get Markdown length in bytes.
    pub fn content_len(&self) -> usize {
        self.markdown.len()
    }
}

/// Converts positioned tokens into Markdown.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter after validating the options.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a flat token stream, grouping tokens by their page index.
    pub fn convert_tokens(&self, tokens: Vec<Token>) -> Result<ConvertResult> {
        self.convert_pages(group_by_page(tokens))
    }

    /// Convert pages of tokens.
    pub fn convert_pages(&self, pages: Vec<PageTokens>) -> Result<ConvertResult> {
        self.options.check_cancelled()?;
        let layout_options = &self.options.layout;

        let layouts: Vec<PageLayout> = if self.options.parallel {
            pages
                .par_iter()
                .map(|page| {
                    self.options.check_cancelled()?;
                    Ok(layout_page(page, layout_options))
                })
                .collect::<Result<_>>()?
        } else {
            pages
                .iter()
                .map(|page| {
                    self.options.check_cancelled()?;
                    Ok(layout_page(page, layout_options))
                })
                .collect::<Result<_>>()?
        };

        self.finish(layouts)
    }

    /// Convert pages pulled from a [`TokenSource`].
    ///
    /// Each page is laid out as soon as the source yields it; results are
    /// gathered over a channel and put back in page order. A source error
    /// aborts the conversion after in-flight pages finish.
    pub fn convert_source<S>(&self, mut source: S) -> Result<ConvertResult>
    where
        S: TokenSource + Send,
    {
        self.options.check_cancelled()?;
        let layout_options = &self.options.layout;
        let cancellation = self.options.cancellation.as_ref();

        if !self.options.parallel {
            let mut layouts = Vec::new();
            while let Some(page) = source.next_page() {
                self.options.check_cancelled()?;
                layouts.push(layout_page(&page?, layout_options));
            }
            return self.finish(layouts);
        }

        let (tx, rx) = crossbeam_channel::unbounded::<PageLayout>();
        let read: Result<usize> = rayon::scope(|s| {
            let mut count = 0;
            while let Some(page) = source.next_page() {
                self.options.check_cancelled()?;
                let page = page?;
                count += 1;
                let tx = tx.clone();
                s.spawn(move |_| {
                    if cancellation.is_some_and(CancellationToken::is_cancelled) {
                        return;
                    }
                    let layout = layout_page(&page, layout_options);
                    // The receiver outlives the scope
                    let _ = tx.send(layout);
                });
            }
            Ok(count)
        });
        drop(tx);

        let layouts: Vec<PageLayout> = rx.iter().collect();
        let count = read?;
        self.options.check_cancelled()?;
        log::debug!("Received {} page(s) from token source", count);
        self.finish(layouts)
    }

    /// Document-wide statistics, classification, ordering and rendering.
    fn finish(&self, mut layouts: Vec<PageLayout>) -> Result<ConvertResult> {
        layouts.sort_by_key(|l| l.page);
        let layout_options = &self.options.layout;
        let stats = DocumentStats::compute(&layouts, layout_options);

        self.options.check_cancelled()?;
        let analyzed: Vec<AnalyzedPage> = if self.options.parallel {
            layouts
                .par_iter()
                .map(|layout| {
                    self.options.check_cancelled()?;
                    Ok(analyze_page(layout, &stats, layout_options))
                })
                .collect::<Result<_>>()?
        } else {
            layouts
                .iter()
                .map(|layout| {
                    self.options.check_cancelled()?;
                    Ok(analyze_page(layout, &stats, layout_options))
                })
                .collect::<Result<_>>()?
        };

        let mut extraction = ExtractionStats::new();
        let mut warnings = Vec::new();
        for (layout, page) in layouts.iter().zip(&analyzed) {
            if layout.malformed > 0 {
                warnings.push(Warning::MalformedTokens {
                    page: layout.page,
                    count: layout.malformed,
                });
            }
            warnings.extend(page.warnings.iter().cloned());
            if page.items.is_empty() {
                extraction.empty_pages += 1;
            }
            extraction.malformed_tokens += layout.malformed as u32;
            extraction.table_demotions += page.demoted_rows as u32;
        }

        self.options.check_cancelled()?;
        let document = resolve(analyzed);
        let markdown = to_markdown(&document, &self.options.render)?;

        let mut doc_stats = ExtractionStats::from_document(&document);
        doc_stats.merge(&extraction);
        log::debug!(
            "Converted {} page(s): {} unit(s), {} warning(s)",
            document.page_count,
            document.unit_count(),
            warnings.len()
        );

        Ok(ConvertResult {
            markdown,
            document,
            stats: doc_stats,
            warnings,
        })
    }
}
