//! Block classification.
//!
//! Each candidate block is split into segments at typographic changes, and
//! every segment gets exactly one role. The rules are tried in order and the
//! first match wins:
//!
//! 1. code: every line is set in a fixed-pitch font
//! 2. heading: few words in a font clearly larger than the body
//! 3. list item: the first line starts with a bullet or ordinal marker
//! 4. table row: every line breaks into two or more cells
//! 5. paragraph: everything else
//!
//! Classification never fails; anything ambiguous ends up as a paragraph.

use std::ops::Range;

use crate::layout::line::{join_tokens, Line};
use crate::layout::markers::{parse_list_marker, starts_with_marker};
use crate::layout::median;
use crate::layout::options::LayoutOptions;
use crate::layout::segment::{CandidateBlock, PageLayout};
use crate::layout::stats::DocumentStats;
use crate::layout::text::join_wrapped_lines;

/// Font size difference that starts a new segment.
const SIZE_CHANGE: f32 = 0.5;

/// Upper bound on reconstructed leading spaces in a code line.
const MAX_CODE_INDENT: usize = 120;

/// Horizontal extent and text of one table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpan {
    /// Left edge of the cell
    pub x0: f32,
    /// Right edge of the cell
    pub x1: f32,
    /// Cell text
    pub text: String,
}

/// The role assigned to a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
    },
    /// Running text
    Paragraph,
    /// One list item including its continuation lines
    ListItem {
        /// Whether the marker is an ordinal
        ordered: bool,
        /// Marker as written
        marker: String,
        /// Nesting level, 0 = outermost
        level: u8,
    },
    /// One line of a candidate table
    TableRow {
        /// Cells left to right
        cells: Vec<CellSpan>,
    },
    /// One line of preformatted code
    CodeLine,
}

/// A classified block with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    /// Assigned role
    pub kind: BlockKind,
    /// Page index (0-based)
    pub page: usize,
    /// Column index
    pub column: usize,
    /// Top edge
    pub top: f32,
    /// Whether the block lies in a margin band
    pub marginal: bool,
    /// Contributing lines, as a range into [`PageLayout::lines`]
    pub lines: Range<usize>,
    /// Index of the candidate block the lines came from
    pub source: usize,
    /// Dominant font size
    pub font_size: f32,
    /// Rendered text (marker stripped for list items)
    pub text: String,
}

impl TypedBlock {
    /// Cells of a table row.
    pub fn cells(&self) -> Option<&[CellSpan]> {
        match &self.kind {
            BlockKind::TableRow { cells } => Some(cells),
            _ => None,
        }
    }

    /// Check if this block is a table row.
    pub fn is_table_row(&self) -> bool {
        matches!(self.kind, BlockKind::TableRow { .. })
    }

    /// Check if this block is a code line.
    pub fn is_code_line(&self) -> bool {
        matches!(self.kind, BlockKind::CodeLine)
    }
}

/// Split a line into cells at gaps wider than `cell_gap_ratio` times the
/// font size.
pub fn row_cells(line: &Line, cell_gap_ratio: f32) -> Vec<CellSpan> {
    let threshold = cell_gap_ratio * line.font_size;
    let mut cells = Vec::new();
    let mut start = 0;

    for i in 1..=line.tokens.len() {
        let split = i == line.tokens.len()
            || line.tokens[i].bbox.x0 - line.tokens[i - 1].bbox.x1 > threshold;
        if split {
            let tokens = &line.tokens[start..i];
            cells.push(CellSpan {
                x0: tokens[0].bbox.x0,
                x1: tokens.iter().map(|t| t.bbox.x1).fold(f32::MIN, f32::max),
                text: join_tokens(tokens, line.font_size),
            });
            start = i;
        }
    }
    cells
}

fn is_table_like(line: &Line, options: &LayoutOptions) -> bool {
    !line.monospace && row_cells(line, options.cell_gap_ratio).len() >= 2
}

/// Whether `cur` starts a new list item inside a block.
///
/// A marker-shaped wrap such as "J. Smith" or "- at least" only counts when
/// the block is already a list, the line is indented past the previous one,
/// or the previous line is a lead-in ending in a colon.
fn opens_list_item(segment_first: &Line, prev: &Line, cur: &Line) -> bool {
    if !starts_with_marker(&cur.text) {
        return false;
    }
    starts_with_marker(&segment_first.text)
        || cur.x0 > prev.x0 + cur.font_size * 0.5
        || prev.text.trim_end().ends_with(':')
}

/// Split a candidate block into typographically uniform segments.
pub(crate) fn split_segments(
    lines: &[Line],
    range: Range<usize>,
    options: &LayoutOptions,
) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start = range.start;

    for i in (range.start + 1)..range.end {
        let (prev, cur) = (&lines[i - 1], &lines[i]);
        let both_code = prev.monospace && cur.monospace;
        let boundary = prev.monospace != cur.monospace
            || (prev.font_size - cur.font_size).abs() > SIZE_CHANGE
            || (!both_code && opens_list_item(&lines[start], prev, cur))
            || (!both_code && is_table_like(prev, options) != is_table_like(cur, options));
        if boundary {
            segments.push(start..i);
            start = i;
        }
    }
    if start < range.end {
        segments.push(start..range.end);
    }
    segments
}

/// Representative font size of a segment.
pub(crate) fn segment_size(lines: &[Line]) -> f32 {
    let mut sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
    median(&mut sizes).unwrap_or(0.0)
}

/// Whether a segment is short and large enough to be a heading.
pub(crate) fn is_heading_candidate(
    lines: &[Line],
    body_size: f32,
    options: &LayoutOptions,
) -> bool {
    let words: usize = lines.iter().map(Line::word_count).sum();
    words > 0
        && words <= options.heading_max_words
        && segment_size(lines) >= body_size * options.heading_size_ratio
}

/// Classify every candidate block of a page.
///
/// Table rows without an aligned neighbour fall through to paragraphs here;
/// grid reconciliation happens in [`crate::layout::table`].
pub fn classify_page(
    layout: &PageLayout,
    stats: &DocumentStats,
    options: &LayoutOptions,
) -> Vec<TypedBlock> {
    let code_bases = code_bases(layout);
    let mut blocks = Vec::new();

    for (source, candidate) in layout.blocks.iter().enumerate() {
        for segment in split_segments(&layout.lines, candidate.lines.clone(), options) {
            let ctx = SegmentContext {
                layout,
                candidate,
                source,
                stats,
                options,
                code_base: code_bases[candidate.column],
            };
            classify_segment(&ctx, segment, &mut blocks);
        }
    }

    let demoted = confirm_table_rows(&mut blocks, options.table_column_tolerance);
    let blocks = merge_demoted_rows(layout, blocks, &demoted);

    log::debug!(
        "Page {}: classified {} block(s), {} unaligned table row(s)",
        layout.page,
        blocks.len(),
        demoted.iter().filter(|d| **d).count()
    );
    blocks
}

struct SegmentContext<'a> {
    layout: &'a PageLayout,
    candidate: &'a CandidateBlock,
    source: usize,
    stats: &'a DocumentStats,
    options: &'a LayoutOptions,
    code_base: f32,
}

impl SegmentContext<'_> {
    fn block(&self, kind: BlockKind, lines: Range<usize>, text: String) -> TypedBlock {
        let slice = &self.layout.lines[lines.clone()];
        TypedBlock {
            kind,
            page: self.layout.page,
            column: self.candidate.column,
            top: slice.iter().map(|l| l.top).fold(f32::MAX, f32::min),
            marginal: self.candidate.marginal,
            lines,
            source: self.source,
            font_size: segment_size(slice),
            text,
        }
    }
}

fn classify_segment(ctx: &SegmentContext<'_>, segment: Range<usize>, out: &mut Vec<TypedBlock>) {
    let lines = &ctx.layout.lines[segment.clone()];
    let options = ctx.options;

    if lines.iter().all(|l| l.monospace) {
        let char_width = code_char_width(lines);
        for (offset, line) in lines.iter().enumerate() {
            let index = segment.start + offset;
            let text = code_text(line, ctx.code_base, char_width);
            out.push(ctx.block(BlockKind::CodeLine, index..index + 1, text));
        }
        return;
    }

    let texts = || lines.iter().map(|l| l.text.as_str());

    if is_heading_candidate(lines, ctx.stats.body_size, options) {
        let level = ctx.stats.heading_level(segment_size(lines));
        out.push(ctx.block(
            BlockKind::Heading { level },
            segment,
            join_wrapped_lines(texts()),
        ));
        return;
    }

    if let Some(marker) = parse_list_marker(&lines[0].text) {
        let indent = lines[0].x0 - ctx.layout.column_left(ctx.candidate.column);
        let level = (indent.max(0.0) / ctx.stats.list_indent_unit).round();
        let level = level.min(u8::MAX as f32) as u8;
        let text = join_wrapped_lines(
            std::iter::once(marker.rest.as_str()).chain(texts().skip(1)),
        );
        out.push(ctx.block(
            BlockKind::ListItem {
                ordered: marker.ordered,
                marker: marker.marker,
                level,
            },
            segment,
            text,
        ));
        return;
    }

    let rows: Vec<Vec<CellSpan>> = lines
        .iter()
        .map(|l| row_cells(l, options.cell_gap_ratio))
        .collect();
    if rows.iter().all(|cells| cells.len() >= 2) {
        for (offset, cells) in rows.into_iter().enumerate() {
            let index = segment.start + offset;
            let text = lines[offset].text.clone();
            out.push(ctx.block(BlockKind::TableRow { cells }, index..index + 1, text));
        }
        return;
    }

    out.push(ctx.block(BlockKind::Paragraph, segment, join_wrapped_lines(texts())));
}

/// Leftmost start of a code line per column.
fn code_bases(layout: &PageLayout) -> Vec<f32> {
    let columns = layout
        .lines
        .iter()
        .map(|l| l.column + 1)
        .max()
        .unwrap_or(0)
        .max(layout.columns.len());
    let mut bases = vec![f32::MAX; columns.max(1)];
    for line in layout.lines.iter().filter(|l| l.monospace) {
        bases[line.column] = bases[line.column].min(line.x0);
    }
    bases
}

fn code_char_width(lines: &[Line]) -> f32 {
    let chars: usize = lines
        .iter()
        .flat_map(|l| &l.tokens)
        .map(|t| t.text.chars().count())
        .sum();
    let width: f32 = lines
        .iter()
        .flat_map(|l| &l.tokens)
        .map(|t| t.bbox.width())
        .sum();
    if chars > 0 && width > 0.0 {
        width / chars as f32
    } else {
        0.6 * segment_size(lines)
    }
}

/// Rebuild a code line with its horizontal offsets as spaces.
fn code_text(line: &Line, base_x: f32, char_width: f32) -> String {
    let columns = |distance: f32| -> usize {
        ((distance / char_width).round().max(0.0) as usize).min(MAX_CODE_INDENT)
    };

    let mut text = " ".repeat(columns(line.x0 - base_x));
    let mut prev_x1: Option<f32> = None;
    for token in &line.tokens {
        if let Some(x1) = prev_x1 {
            let gap = token.bbox.x0 - x1;
            if gap > 0.15 * line.font_size {
                text.push_str(&" ".repeat(columns(gap).max(1)));
            }
        }
        text.push_str(&token.text);
        prev_x1 = Some(token.bbox.x1);
    }
    text.trim_end().to_string()
}

/// Demote table rows with no aligned neighbour. Returns the demoted flags.
fn confirm_table_rows(blocks: &mut [TypedBlock], tolerance: f32) -> Vec<bool> {
    let aligned_with = |i: usize, j: usize| -> bool {
        let (a, b) = (&blocks[i], &blocks[j]);
        if a.column != b.column || a.marginal != b.marginal {
            return false;
        }
        match (a.cells(), b.cells()) {
            (Some(x), Some(y)) => shares_interior_start(x, y, tolerance),
            _ => false,
        }
    };

    let demoted: Vec<bool> = (0..blocks.len())
        .map(|i| {
            blocks[i].is_table_row()
                && !(i > 0 && aligned_with(i, i - 1))
                && !(i + 1 < blocks.len() && aligned_with(i, i + 1))
        })
        .collect();

    for (block, demote) in blocks.iter_mut().zip(&demoted) {
        if *demote {
            block.kind = BlockKind::Paragraph;
        }
    }
    demoted
}

fn shares_interior_start(a: &[CellSpan], b: &[CellSpan], tolerance: f32) -> bool {
    a.iter()
        .skip(1)
        .any(|x| b.iter().skip(1).any(|y| (x.x0 - y.x0).abs() <= tolerance))
}

/// Fold demoted rows back into the paragraph they were split from.
fn merge_demoted_rows(
    layout: &PageLayout,
    blocks: Vec<TypedBlock>,
    demoted: &[bool],
) -> Vec<TypedBlock> {
    let mut merged: Vec<(TypedBlock, bool)> = Vec::with_capacity(blocks.len());

    for (block, was_row) in blocks.into_iter().zip(demoted.iter().copied()) {
        if let Some((prev, prev_row)) = merged.last_mut() {
            let joinable = prev.kind == BlockKind::Paragraph
                && block.kind == BlockKind::Paragraph
                && (was_row || *prev_row)
                && prev.source == block.source
                && prev.lines.end == block.lines.start
                && (prev.font_size - block.font_size).abs() <= SIZE_CHANGE;
            if joinable {
                prev.lines = prev.lines.start..block.lines.end;
                prev.text = join_wrapped_lines(
                    layout.lines[prev.lines.clone()]
                        .iter()
                        .map(|l| l.text.as_str()),
                );
                *prev_row = true;
                continue;
            }
        }
        merged.push((block, was_row));
    }

    merged.into_iter().map(|(block, _)| block).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_page;
    use crate::model::{BBox, PageTokens, Token};

    fn words(text: &str, x0: f32, y1: f32, size: f32) -> Vec<Token> {
        let mut x = x0;
        text.split(' ')
            .map(|w| {
                let width = w.chars().count() as f32 * size * 0.5;
                let t = Token::new(w, BBox::new(x, y1 - size, x + width, y1), "Times", size);
                x += width + size * 0.3;
                t
            })
            .collect()
    }

    fn classify(tokens: Vec<Token>) -> Vec<TypedBlock> {
        let options = LayoutOptions::default();
        let layout = layout_page(&PageTokens::new(0, tokens), &options);
        let stats = DocumentStats::compute(std::slice::from_ref(&layout), &options);
        classify_page(&layout, &stats, &options)
    }

    #[test]
    fn test_heading_then_paragraph() {
        let mut tokens = words("Introduction", 72.0, 80.0, 20.0);
        tokens.extend(words("Some body text that wraps", 72.0, 120.0, 12.0));
        tokens.extend(words("onto a second line.", 72.0, 134.0, 12.0));
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 1 });
        assert_eq!(blocks[0].text, "Introduction");
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(
            blocks[1].text,
            "Some body text that wraps onto a second line."
        );
    }

    #[test]
    fn test_list_items_split_block() {
        let mut tokens = words("• first item", 72.0, 100.0, 12.0);
        tokens.extend(words("continues here", 84.0, 114.0, 12.0));
        tokens.extend(words("2. second item", 72.0, 128.0, 12.0));
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].kind,
            BlockKind::ListItem {
                ordered: false,
                marker: "•".into(),
                level: 0
            }
        );
        assert_eq!(blocks[0].text, "first item continues here");
        assert!(matches!(
            blocks[1].kind,
            BlockKind::ListItem { ordered: true, .. }
        ));
        assert_eq!(blocks[1].text, "second item");
    }

    #[test]
    fn test_marker_shaped_wrap_stays_in_paragraph() {
        let mut tokens = words("The original study was conducted by Prof.", 72.0, 100.0, 12.0);
        tokens.extend(words("J. Smith and colleagues at the institute", 72.0, 114.0, 12.0));
        tokens.extend(words("over a period of several years.", 72.0, 128.0, 12.0));
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_lead_in_colon_opens_list() {
        let mut tokens = words("Bring the following:", 72.0, 100.0, 12.0);
        tokens.extend(words("- a pen", 72.0, 114.0, 12.0));
        tokens.extend(words("- some paper", 72.0, 128.0, 12.0));
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert!(blocks[1..]
            .iter()
            .all(|b| matches!(b.kind, BlockKind::ListItem { ordered: false, .. })));
    }

    #[test]
    fn test_code_lines_keep_indentation() {
        let mono = |text: &str, x0: f32, y1: f32| {
            let width = text.chars().count() as f32 * 6.0;
            Token::new(text, BBox::new(x0, y1 - 10.0, x0 + width, y1), "Courier", 10.0)
        };
        let tokens = vec![
            mono("fn main() {", 72.0, 100.0),
            mono("run();", 96.0, 112.0),
            mono("}", 72.0, 124.0),
        ];
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(TypedBlock::is_code_line));
        assert_eq!(blocks[1].text, "    run();");
    }

    #[test]
    fn test_aligned_rows_are_table_rows() {
        let mut tokens = Vec::new();
        for (i, (a, b)) in [("Name", "Age"), ("Alice", "30"), ("Bob", "25")]
            .iter()
            .enumerate()
        {
            let y = 100.0 + 14.0 * i as f32;
            tokens.extend(words(a, 72.0, y, 12.0));
            tokens.extend(words(b, 200.0, y, 12.0));
        }
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(TypedBlock::is_table_row));
        assert_eq!(blocks[1].cells().unwrap()[1].text, "30");
    }

    #[test]
    fn test_lone_gapped_line_stays_in_paragraph() {
        let mut tokens = words("A normal line of text", 72.0, 100.0, 12.0);
        tokens.extend(words("with", 72.0, 114.0, 12.0));
        tokens.extend(words("gap", 160.0, 114.0, 12.0));
        tokens.extend(words("and the end.", 72.0, 128.0, 12.0));
        let blocks = classify(tokens);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].text, "A normal line of text with gap and the end.");
    }

    #[test]
    fn test_row_cells() {
        let options = LayoutOptions::default();
        let mut tokens = words("one two", 72.0, 100.0, 10.0);
        tokens.extend(words("three", 200.0, 100.0, 10.0));
        let layout = layout_page(&PageTokens::new(0, tokens), &options);
        let cells = row_cells(&layout.lines[0], options.cell_gap_ratio);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].text, "one two");
        assert_eq!(cells[1].x0, 200.0);
    }
}
