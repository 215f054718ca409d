//! Layout analysis: from positioned tokens to typed, ordered units.
//!
//! The stages run in this order:
//!
//! 1. [`line::normalize_page`] merges tokens into lines (per page)
//! 2. [`segment::segment_page`] finds columns, margins and candidate blocks (per page)
//! 3. [`stats::DocumentStats::compute`] gathers document-wide font statistics
//! 4. [`classify::classify_page`] assigns a role to every block (per page)
//! 5. [`table::reconstruct_tables`] turns runs of table rows into grids (per page)
//! 6. [`reading_order::resolve`] orders everything into a [`Document`](crate::model::Document)
//!
//! Per-page stages share nothing and can run in parallel; see
//! [`crate::convert`].

pub mod classify;
pub mod code;
pub mod line;
pub mod markers;
pub mod options;
pub mod reading_order;
pub mod segment;
pub mod stats;
pub mod table;
pub mod text;

pub use classify::{classify_page, BlockKind, CellSpan, TypedBlock};
pub use line::{normalize_page, Line, NormalizedPage};
pub use options::LayoutOptions;
pub use reading_order::resolve;
pub use segment::{segment_page, CandidateBlock, ColumnSpan, PageLayout};
pub use stats::DocumentStats;
pub use table::{reconstruct_tables, AnalyzedPage, PageItem, PlacedTable};

use crate::model::PageTokens;

/// Run the per-page stages that need no document-wide context.
pub fn layout_page(page: &PageTokens, options: &LayoutOptions) -> PageLayout {
    let normalized = normalize_page(page, options);
    segment_page(page.index, page.height, normalized, options)
}

/// Run the per-page stages that depend on [`DocumentStats`].
pub fn analyze_page(
    layout: &PageLayout,
    stats: &DocumentStats,
    options: &LayoutOptions,
) -> AnalyzedPage {
    let blocks = classify_page(layout, stats, options);
    reconstruct_tables(layout.page, blocks, options)
}

/// Median of the values; reorders the slice.
pub(crate) fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }
}
