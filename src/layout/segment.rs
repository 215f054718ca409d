//! Layout segmentation: columns, margins and candidate blocks.

use std::ops::Range;

use crate::layout::line::{Line, NormalizedPage};
use crate::layout::median;
use crate::layout::options::LayoutOptions;

/// A detected text column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpan {
    /// Column index (0 = leftmost)
    pub index: usize,
    /// Base left margin: leftmost start of a body line in the column
    pub left: f32,
    /// Rightmost end of a line in the column
    pub right: f32,
}

/// An untyped group of consecutive lines of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBlock {
    /// Lines of the block, as a range into [`PageLayout::lines`]
    pub lines: Range<usize>,
    /// Column index
    pub column: usize,
    /// Top edge of the first line
    pub top: f32,
    /// Whether the block lies in a page margin band
    pub marginal: bool,
}

/// Segmentation result for one page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page index (0-based)
    pub page: usize,
    /// Lines ordered by column, then top to bottom
    pub lines: Vec<Line>,
    /// Detected columns, left to right
    pub columns: Vec<ColumnSpan>,
    /// Candidate blocks in line order
    pub blocks: Vec<CandidateBlock>,
    /// Tokens skipped by the normalizer
    pub malformed: usize,
}

impl PageLayout {
    /// Layout of a page without text.
    pub fn empty(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Whether the page has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines of a block.
    pub fn block_lines(&self, block: &CandidateBlock) -> &[Line] {
        &self.lines[block.lines.clone()]
    }

    /// Base left margin of a column.
    pub fn column_left(&self, column: usize) -> f32 {
        self.columns
            .iter()
            .find(|c| c.index == column)
            .map(|c| c.left)
            .unwrap_or(0.0)
    }
}

/// Segment the normalized lines of a page into candidate blocks.
pub fn segment_page(
    page: usize,
    height: Option<f32>,
    normalized: NormalizedPage,
    options: &LayoutOptions,
) -> PageLayout {
    let NormalizedPage { lines, malformed } = normalized;
    if lines.is_empty() {
        return PageLayout {
            malformed,
            ..PageLayout::empty(page)
        };
    }

    let is_marginal = |line: &Line| in_margin(line, height, options.margin_band);

    let body: Vec<&Line> = lines.iter().filter(|&l| !is_marginal(l)).collect();
    let boundaries = detect_column_boundaries(&body);
    if !boundaries.is_empty() {
        log::debug!(
            "Page {}: {} columns, boundaries at {:?}",
            page,
            boundaries.len() + 1,
            boundaries
        );
    }

    let mut lines = merge_row_fragments(page, lines, &boundaries);
    lines.sort_by(|a, b| {
        a.column
            .cmp(&b.column)
            .then(a.row.cmp(&b.row))
            .then(a.x0.total_cmp(&b.x0))
    });

    let marginal: Vec<bool> = lines.iter().map(is_marginal).collect();
    let columns = column_spans(&lines, &marginal, boundaries.len() + 1);
    let blocks = split_blocks(&lines, &marginal, options.block_gap_multiplier);

    PageLayout {
        page,
        lines,
        columns,
        blocks,
        malformed,
    }
}

fn in_margin(line: &Line, height: Option<f32>, band: f32) -> bool {
    if band <= 0.0 {
        return false;
    }
    if line.bottom <= band {
        return true;
    }
    matches!(height, Some(h) if line.top >= h - band)
}

/// Find the left edges of columns 1..n.
///
/// Returns an empty list for single-column pages.
fn detect_column_boundaries(lines: &[&Line]) -> Vec<f32> {
    if lines.len() < 4 {
        return Vec::new();
    }

    let mut sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
    let median_size = median(&mut sizes).unwrap_or(12.0);
    let min_x = lines.iter().map(|l| l.x0).fold(f32::MAX, f32::min);
    let max_x = lines.iter().map(|l| l.x1).fold(f32::MIN, f32::max);
    let threshold = (8.0 * median_size).max(0.2 * (max_x - min_x));

    let mut starts: Vec<f32> = lines.iter().map(|l| l.x0).collect();
    starts.sort_by(f32::total_cmp);

    let mut groups: Vec<Vec<f32>> = Vec::new();
    for x in starts {
        match groups.last_mut() {
            Some(group) if x - group[group.len() - 1] < threshold => group.push(x),
            _ => groups.push(vec![x]),
        }
    }

    let min_group = 2usize.max((lines.len() as f32 * 0.1).ceil() as usize);
    let mut folded: Vec<Vec<f32>> = Vec::new();
    for group in groups {
        match folded.last_mut() {
            Some(prev) if group.len() < min_group => prev.extend(group),
            _ => folded.push(group),
        }
    }
    if folded.len() > 1 && folded[0].len() < min_group {
        let first = folded.remove(0);
        let mut merged = first;
        merged.append(&mut folded[0]);
        folded[0] = merged;
    }
    if folded.len() < 2 {
        return Vec::new();
    }

    let mut boundaries = Vec::new();
    let mut current_left = folded[0][0];
    for group in &folded[1..] {
        let boundary = group[0];
        let section: Vec<&&Line> = lines
            .iter()
            .filter(|l| l.x0 >= current_left && l.x0 < boundary)
            .collect();
        if section.is_empty() {
            continue;
        }

        let clear = section.iter().filter(|l| l.x1 <= boundary).count();
        let has_gutter = clear * 2 > section.len();

        let mut widths: Vec<f32> = section.iter().map(|l| l.width()).collect();
        let fill = median(&mut widths).unwrap_or(0.0);
        let filled = fill >= 0.5 * (boundary - current_left);

        if has_gutter && filled {
            boundaries.push(boundary);
            current_left = boundary;
        } else {
            log::debug!(
                "Rejected column boundary at {:.1} (gutter: {}, fill: {:.1})",
                boundary,
                has_gutter,
                fill
            );
        }
    }
    boundaries
}

fn column_of(x0: f32, boundaries: &[f32]) -> usize {
    boundaries.iter().filter(|b| x0 >= **b - 0.5).count()
}

/// Assign columns and join fragments of one row that share a column.
fn merge_row_fragments(page: usize, lines: Vec<Line>, boundaries: &[f32]) -> Vec<Line> {
    let mut merged: Vec<Line> = Vec::with_capacity(lines.len());
    for line in lines {
        let column = column_of(line.x0, boundaries);
        match merged.last_mut() {
            Some(prev) if prev.row == line.row && prev.column == column => {
                let mut tokens = std::mem::take(&mut prev.tokens);
                tokens.extend(line.tokens);
                *prev = Line::from_tokens(page, line.row, tokens);
                prev.column = column;
            }
            _ => {
                let mut line = line;
                line.column = column;
                merged.push(line);
            }
        }
    }
    merged
}

fn column_spans(lines: &[Line], marginal: &[bool], count: usize) -> Vec<ColumnSpan> {
    (0..count)
        .map(|index| {
            let in_column = || {
                lines
                    .iter()
                    .zip(marginal)
                    .filter(move |(l, m)| l.column == index && !**m)
                    .map(|(l, _)| l)
            };
            let left = in_column().map(|l| l.x0).fold(f32::MAX, f32::min);
            let right = in_column().map(|l| l.x1).fold(f32::MIN, f32::max);
            ColumnSpan {
                index,
                left: if left == f32::MAX { 0.0 } else { left },
                right: if right == f32::MIN { 0.0 } else { right },
            }
        })
        .collect()
}

fn split_blocks(lines: &[Line], marginal: &[bool], k: f32) -> Vec<CandidateBlock> {
    let mut blocks = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        let column = lines[start].column;
        let end = lines[start..]
            .iter()
            .position(|l| l.column != column)
            .map_or(lines.len(), |offset| start + offset);

        let mut heights: Vec<f32> = lines[start..end].iter().map(Line::height).collect();
        let threshold = k * median(&mut heights).unwrap_or(0.0);

        let mut block_start = start;
        for i in (start + 1)..end {
            let gap = lines[i].top - lines[i - 1].bottom;
            if gap > threshold || marginal[i] != marginal[i - 1] {
                blocks.push(candidate(lines, marginal, block_start..i));
                block_start = i;
            }
        }
        blocks.push(candidate(lines, marginal, block_start..end));
        start = end;
    }
    blocks
}

fn candidate(lines: &[Line], marginal: &[bool], range: Range<usize>) -> CandidateBlock {
    let first = &lines[range.start];
    CandidateBlock {
        column: first.column,
        top: lines[range.clone()]
            .iter()
            .map(|l| l.top)
            .fold(f32::MAX, f32::min),
        marginal: marginal[range.start],
        lines: range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::line::normalize_page;
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

    fn layout(tokens: Vec<Token>, height: Option<f32>) -> PageLayout {
        let mut page = PageTokens::new(0, tokens);
        page.height = height;
        let options = LayoutOptions::default();
        let normalized = normalize_page(&page, &options);
        segment_page(0, height, normalized, &options)
    }

    const BODY: &str = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";

    #[test]
    fn test_empty_page() {
        let page = layout(vec![], None);
        assert!(page.is_empty());
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_paragraph_gap_splits_blocks() {
        let mut tokens = Vec::new();
        for (i, y) in [100.0, 114.0, 128.0, 160.0, 174.0].iter().enumerate() {
            tokens.extend(words(&format!("line {} text", i), 72.0, *y, 12.0));
        }
        let page = layout(tokens, None);
        assert_eq!(page.columns.len(), 1);
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[0].lines, 0..3);
        assert_eq!(page.blocks[1].lines, 3..5);
    }

    #[test]
    fn test_double_spaced_lines_stay_in_one_block() {
        let mut tokens = Vec::new();
        for (i, y) in [100.0, 124.0, 148.0, 172.0].iter().enumerate() {
            tokens.extend(words(&format!("spaced line {} text", i), 72.0, *y, 12.0));
        }
        let page = layout(tokens, None);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].lines, 0..4);
    }

    #[test]
    fn test_two_columns_detected() {
        let mut tokens = Vec::new();
        // Right column emitted first
        for i in 0..6 {
            tokens.extend(words("right column text here", 320.0, 100.0 + 14.0 * i as f32, 10.0));
        }
        for i in 0..6 {
            tokens.extend(words(
                "left column text here with more words",
                72.0,
                100.0 + 14.0 * i as f32,
                10.0,
            ));
        }
        let page = layout(tokens, None);
        assert_eq!(page.columns.len(), 2);
        assert!(page.lines[..6].iter().all(|l| l.column == 0));
        assert!(page.lines[0].text.starts_with("left"));
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[1].column, 1);
    }

    #[test]
    fn test_sparse_table_is_single_column() {
        let mut tokens = Vec::new();
        for i in 0..5 {
            let y = 100.0 + 14.0 * i as f32;
            tokens.extend(words("Alice", 72.0, y, 10.0));
            tokens.extend(words("30", 220.0, y, 10.0));
            tokens.extend(words("Paris", 380.0, y, 10.0));
        }
        let page = layout(tokens, None);
        assert_eq!(page.columns.len(), 1);
        assert_eq!(page.lines.len(), 5);
        assert_eq!(page.lines[0].tokens.len(), 3);
    }

    #[test]
    fn test_centered_title_is_not_a_column() {
        let mut tokens = words("Centered", 260.0, 80.0, 18.0);
        for i in 0..8 {
            tokens.extend(words(BODY, 72.0, 110.0 + 14.0 * i as f32, 10.0));
        }
        let page = layout(tokens, None);
        assert_eq!(page.columns.len(), 1);
    }

    #[test]
    fn test_margin_lines_flagged() {
        let mut tokens = words("Running header", 72.0, 30.0, 9.0);
        tokens.extend(words("Body text", 72.0, 100.0, 12.0));
        tokens.extend(words("7", 300.0, 780.0, 9.0));
        let page = layout(tokens, Some(792.0));
        assert_eq!(page.blocks.len(), 3);
        assert!(page.blocks[0].marginal);
        assert!(!page.blocks[1].marginal);
        assert!(page.blocks[2].marginal);
    }

    #[test]
    fn test_bottom_band_needs_page_height() {
        let tokens = words("7", 300.0, 780.0, 9.0);
        let page = layout(tokens, None);
        assert!(!page.blocks[0].marginal);
    }
}
