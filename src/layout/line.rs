//! Token stream normalization: raw tokens to ordered text lines.

use crate::layout::code::is_monospace_font;
use crate::layout::options::LayoutOptions;
use crate::layout::text::{clean_token_text, push_with_space, word_count};
use crate::model::{PageTokens, Token};

/// Gap between tokens, as a fraction of font size, that reads as a space.
const WORD_GAP_RATIO: f32 = 0.15;

/// A run of tokens sharing a baseline on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Page index (0-based)
    pub page: usize,
    /// Baseline group this line came from; fragments of one visual row share it
    pub row: usize,
    /// Column index, assigned by the segmenter
    pub column: usize,
    /// Tokens sorted left to right
    pub tokens: Vec<Token>,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub top: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Baseline of the dominant-size tokens
    pub baseline: f32,
    /// Most frequent font size
    pub font_size: f32,
    /// Whether every token is set in a fixed-pitch font
    pub monospace: bool,
    /// Joined text
    pub text: String,
}

impl Line {
    /// Build a line from left-to-right ordered, non-empty tokens.
    pub fn from_tokens(page: usize, row: usize, tokens: Vec<Token>) -> Self {
        let font_size = dominant_size(&tokens);
        let x0 = fold(&tokens, |t| t.bbox.x0, f32::min);
        let x1 = fold(&tokens, |t| t.bbox.x1, f32::max);
        let top = fold(&tokens, |t| t.bbox.y0, f32::min);
        let bottom = fold(&tokens, |t| t.bbox.y1, f32::max);
        let baseline = tokens
            .iter()
            .filter(|t| same_size(t.font_size, font_size))
            .map(|t| t.baseline())
            .fold(f32::NEG_INFINITY, f32::max);
        let baseline = if baseline.is_finite() { baseline } else { bottom };
        let monospace = !tokens.is_empty() && tokens.iter().all(|t| t.monospace);
        let text = join_tokens(&tokens, font_size);

        Self {
            page,
            row,
            column: 0,
            tokens,
            x0,
            x1,
            top,
            bottom,
            baseline,
            font_size,
            monospace,
            text,
        }
    }

    /// Width of the line.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the line box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Number of words in the line.
    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// Number of characters, excluding whitespace.
    pub fn char_count(&self) -> usize {
        self.tokens
            .iter()
            .map(|t| t.text.chars().filter(|c| !c.is_whitespace()).count())
            .sum()
    }
}

/// Lines of one page plus the number of skipped tokens.
#[derive(Debug, Clone, Default)]
pub struct NormalizedPage {
    /// Lines ordered by baseline, then left edge
    pub lines: Vec<Line>,
    /// Tokens skipped for a degenerate bounding box
    pub malformed: usize,
}

/// Merge the tokens of one page into ordered lines.
///
/// Each baseline group is split wherever the horizontal gap exceeds
/// `column_gap_ratio` times the font size, so text from neighbouring columns
/// never ends up in one line. The segmenter joins fragments of a row again
/// when they fall into the same column.
pub fn normalize_page(page: &PageTokens, options: &LayoutOptions) -> NormalizedPage {
    let mut malformed = 0;
    let mut tokens: Vec<(usize, Token)> = Vec::with_capacity(page.tokens.len());

    for (index, raw) in page.tokens.iter().enumerate() {
        if raw.bbox.is_degenerate() {
            malformed += 1;
            continue;
        }
        let text = clean_token_text(&raw.text);
        if text.trim().is_empty() {
            continue;
        }
        let monospace = raw.monospace || is_monospace_font(&raw.font_family);
        tokens.push((
            index,
            Token {
                text,
                font_size: raw.effective_size(),
                page: page.index,
                monospace,
                ..raw.clone()
            },
        ));
    }

    if malformed > 0 {
        log::warn!(
            "Page {}: skipped {} token(s) with a degenerate bounding box",
            page.index,
            malformed
        );
    }

    tokens.sort_by(|(ia, a), (ib, b)| {
        a.baseline()
            .total_cmp(&b.baseline())
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
            .then(ia.cmp(ib))
    });

    let mut lines = Vec::new();
    let mut group: Vec<(usize, Token)> = Vec::new();
    let mut anchor = 0.0f32;
    let mut min_size = f32::MAX;
    let mut row = 0;

    for (index, token) in tokens {
        if !group.is_empty() {
            let tolerance = options.line_tolerance * token.font_size.min(min_size);
            if (token.baseline() - anchor).abs() > tolerance {
                split_group(page.index, row, std::mem::take(&mut group), options, &mut lines);
                row += 1;
            }
        }
        if group.is_empty() {
            anchor = token.baseline();
            min_size = token.font_size;
        } else {
            min_size = min_size.min(token.font_size);
        }
        group.push((index, token));
    }
    if !group.is_empty() {
        split_group(page.index, row, group, options, &mut lines);
    }

    log::debug!("Page {}: {} line(s)", page.index, lines.len());

    NormalizedPage { lines, malformed }
}

fn split_group(
    page: usize,
    row: usize,
    mut group: Vec<(usize, Token)>,
    options: &LayoutOptions,
    lines: &mut Vec<Line>,
) {
    group.sort_by(|(ia, a), (ib, b)| a.bbox.x0.total_cmp(&b.bbox.x0).then(ia.cmp(ib)));

    let mut current: Vec<Token> = Vec::new();
    for (_, token) in group {
        if let Some(prev) = current.last() {
            let gap = token.bbox.x0 - prev.bbox.x1;
            if gap > options.column_gap_ratio * prev.font_size.min(token.font_size) {
                lines.push(Line::from_tokens(page, row, std::mem::take(&mut current)));
            }
        }
        current.push(token);
    }
    if !current.is_empty() {
        lines.push(Line::from_tokens(page, row, current));
    }
}

/// Join left-to-right tokens, inserting a space where the gap reads as one.
pub(crate) fn join_tokens(tokens: &[Token], font_size: f32) -> String {
    let mut text = String::new();
    let mut prev_x1: Option<f32> = None;
    for token in tokens {
        match prev_x1 {
            Some(x1) if token.bbox.x0 - x1 > WORD_GAP_RATIO * font_size => {
                push_with_space(&mut text, &token.text)
            }
            _ => text.push_str(&token.text),
        }
        prev_x1 = Some(prev_x1.map_or(token.bbox.x1, |x| x.max(token.bbox.x1)));
    }
    let collapsed: Vec<&str> = text.split_whitespace().collect();
    collapsed.join(" ")
}

/// Most frequent font size; ties go to the leftmost token.
fn dominant_size(tokens: &[Token]) -> f32 {
    let mut counts: Vec<(i32, f32, usize)> = Vec::new();
    for token in tokens {
        let key = (token.font_size * 10.0).round() as i32;
        match counts.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2 += 1,
            None => counts.push((key, token.font_size, 1)),
        }
    }
    let mut best: Option<(f32, usize)> = None;
    for (_, size, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((size, count));
        }
    }
    best.map(|(size, _)| size).unwrap_or(0.0)
}

fn same_size(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.05
}

fn fold(tokens: &[Token], key: impl Fn(&Token) -> f32, pick: fn(f32, f32) -> f32) -> f32 {
    tokens.iter().map(key).reduce(pick).unwrap_or(0.0)
}
