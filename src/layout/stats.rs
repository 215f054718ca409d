//! Document-wide font and indentation statistics.

use crate::layout::classify::{is_heading_candidate, segment_size, split_segments};
use crate::layout::markers::starts_with_marker;
use crate::layout::options::{LayoutOptions, FALLBACK_LIST_INDENT_UNIT};
use crate::layout::segment::PageLayout;

/// Sizes closer than this share a heading level.
const SIZE_TOLERANCE: f32 = 0.5;

/// Indents at or below this are treated as flush with the column.
const MIN_INDENT: f32 = 2.0;

/// Statistics gathered once over all pages before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStats {
    /// Character-weighted median font size of body lines
    pub body_size: f32,
    /// Distinct heading sizes, largest first
    pub heading_sizes: Vec<f32>,
    /// Indent step between list nesting levels, in points
    pub list_indent_unit: f32,
    /// Fraction of characters set in a fixed-pitch font
    pub monospace_ratio: f32,
}

impl Default for DocumentStats {
    fn default() -> Self {
        Self {
            body_size: 12.0,
            heading_sizes: Vec::new(),
            list_indent_unit: FALLBACK_LIST_INDENT_UNIT,
            monospace_ratio: 0.0,
        }
    }
}

impl DocumentStats {
    /// Compute statistics over the segmented pages.
    pub fn compute(layouts: &[PageLayout], options: &LayoutOptions) -> Self {
        let mut weighted: Vec<(f32, usize)> = Vec::new();
        let mut mono_chars = 0usize;
        let mut total_chars = 0usize;

        for layout in layouts {
            for block in layout.blocks.iter().filter(|b| !b.marginal) {
                for line in layout.block_lines(block) {
                    for token in &line.tokens {
                        let chars = token.text.chars().filter(|c| !c.is_whitespace()).count();
                        weighted.push((token.font_size, chars));
                    }
                    let chars = line.char_count();
                    total_chars += chars;
                    if line.monospace {
                        mono_chars += chars;
                    }
                }
            }
        }

        let Some(body_size) = weighted_median(&mut weighted) else {
            return Self {
                list_indent_unit: options
                    .list_indent_unit
                    .unwrap_or(FALLBACK_LIST_INDENT_UNIT),
                ..Self::default()
            };
        };

        let mut heading_sizes = Vec::new();
        let mut min_indent: Option<f32> = None;

        for layout in layouts {
            for block in layout.blocks.iter().filter(|b| !b.marginal) {
                for segment in split_segments(&layout.lines, block.lines.clone(), options) {
                    let lines = &layout.lines[segment];
                    if lines.iter().all(|l| l.monospace) {
                        continue;
                    }
                    if is_heading_candidate(lines, body_size, options) {
                        heading_sizes.push(segment_size(lines));
                        continue;
                    }
                    if starts_with_marker(&lines[0].text) {
                        let indent = lines[0].x0 - layout.column_left(block.column);
                        if indent > MIN_INDENT {
                            min_indent = Some(min_indent.map_or(indent, |m| m.min(indent)));
                        }
                    }
                }
            }
        }

        let stats = Self {
            body_size,
            heading_sizes: rank_sizes(heading_sizes),
            list_indent_unit: options
                .list_indent_unit
                .or(min_indent)
                .unwrap_or(FALLBACK_LIST_INDENT_UNIT),
            monospace_ratio: if total_chars > 0 {
                mono_chars as f32 / total_chars as f32
            } else {
                0.0
            },
        };

        log::debug!(
            "Body size {:.1}pt, heading sizes {:?}, list indent {:.1}pt",
            stats.body_size,
            stats.heading_sizes,
            stats.list_indent_unit
        );
        stats
    }

    /// Heading level (1-6) for a font size; larger sizes get lower levels.
    pub fn heading_level(&self, font_size: f32) -> u8 {
        for (i, &size) in self.heading_sizes.iter().enumerate() {
            if font_size >= size - SIZE_TOLERANCE {
                return (i + 1).min(6) as u8;
            }
        }
        // Smaller than every ranked size
        self.heading_sizes.len().clamp(1, 6) as u8
    }
}

/// Sort sizes largest first and merge sizes within the tolerance.
fn rank_sizes(mut sizes: Vec<f32>) -> Vec<f32> {
    sizes.sort_by(|a, b| b.total_cmp(a));
    let mut ranked: Vec<f32> = Vec::new();
    for size in sizes {
        match ranked.last() {
            Some(&last) if last - size <= SIZE_TOLERANCE => {}
            _ => ranked.push(size),
        }
    }
    ranked
}

fn weighted_median(values: &mut [(f32, usize)]) -> Option<f32> {
    let total: usize = values.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    values.sort_by(|a, b| a.0.total_cmp(&b.0));
    let half = total.div_ceil(2);
    let mut seen = 0;
    for (value, weight) in values.iter() {
        seen += weight;
        if seen >= half {
            return Some(*value);
        }
    }
    values.last().map(|(v, _)| *v)
}
