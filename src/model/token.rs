//! Input tokens produced by the external PDF text extractor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An axis-aligned bounding box in page space.
///
/// The origin is the top-left corner of the page and `y` grows downward, so
/// `y0` is the top edge and `y1` the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Whether the box has no usable area (zero, negative or non-finite).
    pub fn is_degenerate(&self) -> bool {
        let finite = self.x0.is_finite()
            && self.y0.is_finite()
            && self.x1.is_finite()
            && self.y1.is_finite();
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// A positioned run of text with font metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content
    pub text: String,
    /// Bounding box in page space
    pub bbox: BBox,
    /// Font family name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_family: String,
    /// Font size in points
    pub font_size: f32,
    /// Page index (0-based)
    #[serde(default)]
    pub page: usize,
    /// Whether the extractor reported a fixed-pitch font
    #[serde(default)]
    pub monospace: bool,
}

impl Token {
    /// Create a token on page 0 with a proportional font.
    pub fn new(
        text: impl Into<String>,
        bbox: BBox,
        font_family: impl Into<String>,
        font_size: f32,
    ) -> Self {
        Self {
            text: text.into(),
            bbox,
            font_family: font_family.into(),
            font_size,
            page: 0,
            monospace: false,
        }
    }

    /// Set the page index and return self.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Mark the token as fixed-pitch and return self.
    pub fn monospaced(mut self) -> Self {
        self.monospace = true;
        self
    }

    /// Baseline, approximated by the bottom edge.
    pub fn baseline(&self) -> f32 {
        self.bbox.y1
    }

    /// Font size to use for layout decisions.
    ///
    /// Falls back to the box height when the reported size is unusable.
    pub fn effective_size(&self) -> f32 {
        if self.font_size.is_finite() && self.font_size > 0.0 {
            self.font_size
        } else {
            self.bbox.height()
        }
    }
}

/// All tokens of one page, in the order the extractor emitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTokens {
    /// Page index (0-based)
    pub index: usize,
    /// Page width in points, if known
    #[serde(default)]
    pub width: Option<f32>,
    /// Page height in points, if known
    #[serde(default)]
    pub height: Option<f32>,
    /// Tokens in emission order
    pub tokens: Vec<Token>,
}

impl PageTokens {
    /// Create a page of tokens with unknown dimensions.
    pub fn new(index: usize, tokens: Vec<Token>) -> Self {
        Self {
            index,
            width: None,
            height: None,
            tokens,
        }
    }

    /// Set the page dimensions and return self.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Check if the page has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Group a flat token stream into pages by [`Token::page`].
///
/// Pages are returned in ascending index order; emission order within a page
/// is preserved. Page indices with no tokens are not materialized.
pub fn group_by_page(tokens: Vec<Token>) -> Vec<PageTokens> {
    let mut pages: BTreeMap<usize, Vec<Token>> = BTreeMap::new();
    for token in tokens {
        pages.entry(token.page).or_default().push(token);
    }
    pages
        .into_iter()
        .map(|(index, tokens)| PageTokens::new(index, tokens))
        .collect()
}

/// Load pages from a JSON token dump.
///
/// Accepts either an array of pages (`[{"index":0,"tokens":[...]}, ...]`) or
/// a flat array of tokens, which is grouped with [`group_by_page`].
pub fn tokens_from_json(json: &str) -> Result<Vec<PageTokens>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dump {
        Pages(Vec<PageTokens>),
        Tokens(Vec<Token>),
    }

    let pages = match serde_json::from_str::<Dump>(json)? {
        Dump::Pages(pages) => pages,
        Dump::Tokens(tokens) => group_by_page(tokens),
    };
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, page: usize) -> Token {
        Token::new(text, BBox::new(0.0, 0.0, 10.0, 12.0), "Helvetica", 12.0).on_page(page)
    }

    #[test]
    fn test_bbox_degenerate() {
        assert!(!BBox::new(0.0, 0.0, 10.0, 10.0).is_degenerate());
        assert!(BBox::new(5.0, 0.0, 5.0, 10.0).is_degenerate());
        assert!(BBox::new(0.0, 10.0, 10.0, 2.0).is_degenerate());
        assert!(BBox::new(f32::NAN, 0.0, 10.0, 10.0).is_degenerate());
    }

    #[test]
    fn test_effective_size_falls_back_to_height() {
        let mut t = token("x", 0);
        assert_eq!(t.effective_size(), 12.0);
        t.font_size = 0.0;
        assert_eq!(t.effective_size(), 12.0);
        t.bbox = BBox::new(0.0, 0.0, 4.0, 9.0);
        assert_eq!(t.effective_size(), 9.0);
    }

    #[test]
    fn test_group_by_page_preserves_order() {
        let pages = group_by_page(vec![token("b", 1), token("a", 0), token("c", 1)]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[1].tokens[0].text, "b");
        assert_eq!(pages[1].tokens[1].text, "c");
    }

    #[test]
    fn test_tokens_from_json_flat() {
        let json = r#"[
            {"text":"Hi","bbox":{"x0":0,"y0":0,"x1":10,"y1":12},"font_size":12,"page":2}
        ]"#;
        let pages = tokens_from_json(json).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 2);
        assert!(!pages[0].tokens[0].monospace);
    }

    #[test]
    fn test_tokens_from_json_pages() {
        let json = r#"[{"index":0,"height":792,"tokens":[]}]"#;
        let pages = tokens_from_json(json).unwrap();
        assert_eq!(pages[0].height, Some(792.0));
        assert!(pages[0].is_empty());
    }
}
