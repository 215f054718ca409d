//! Layout analysis options and their defaults.

use crate::error::{Error, Result};

/// Default ratio of a heading's font size to the body font size.
pub const DEFAULT_HEADING_SIZE_RATIO: f32 = 1.2;

/// Default block gap multiplier (`k`), in median line heights.
pub const DEFAULT_BLOCK_GAP_MULTIPLIER: f32 = 1.5;

/// Default minimum number of rows for a table.
pub const DEFAULT_MIN_TABLE_ROWS: usize = 2;

/// Default height of the top/bottom margin bands, in points.
pub const DEFAULT_MARGIN_BAND: f32 = 48.0;

/// List indent unit used when a document shows no nested list.
pub const FALLBACK_LIST_INDENT_UNIT: f32 = 18.0;

/// Options for layout analysis.
///
/// Ratios are relative to the font size of the tokens involved; absolute
/// distances are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Minimum ratio of a block's font size to the body size for a heading
    pub heading_size_ratio: f32,

    /// Maximum word count of a heading block
    pub heading_max_words: usize,

    /// A new block starts when the whitespace between two lines exceeds
    /// this many median line heights
    pub block_gap_multiplier: f32,

    /// Minimum rows for a table; shorter runs become paragraphs
    pub min_table_rows: usize,

    /// Fixed list indent unit in points (derived from the document if unset)
    pub list_indent_unit: Option<f32>,

    /// Height of the top and bottom margin bands in points
    pub margin_band: f32,

    /// Baseline tolerance for joining tokens into a line (fraction of the
    /// smaller font size)
    pub line_tolerance: f32,

    /// Horizontal gap (fraction of font size) that splits a baseline into
    /// separate line fragments
    pub column_gap_ratio: f32,

    /// Horizontal gap (fraction of font size) that separates table cells
    pub cell_gap_ratio: f32,

    /// Distance in points within which cell starts share a table column
    pub table_column_tolerance: f32,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading size ratio.
    pub fn with_heading_size_ratio(mut self, ratio: f32) -> Self {
        self.heading_size_ratio = ratio;
        self
    }

    /// Set the maximum heading word count.
    pub fn with_heading_max_words(mut self, words: usize) -> Self {
        self.heading_max_words = words;
        self
    }

    /// Set the block gap multiplier.
    pub fn with_block_gap_multiplier(mut self, k: f32) -> Self {
        self.block_gap_multiplier = k;
        self
    }

    /// Set the minimum table row count.
    pub fn with_min_table_rows(mut self, rows: usize) -> Self {
        self.min_table_rows = rows;
        self
    }

    /// Override the list indent unit.
    pub fn with_list_indent_unit(mut self, unit: f32) -> Self {
        self.list_indent_unit = Some(unit);
        self
    }

    /// Set the margin band height.
    pub fn with_margin_band(mut self, band: f32) -> Self {
        self.margin_band = band;
        self
    }

    /// Set the cell gap ratio.
    pub fn with_cell_gap_ratio(mut self, ratio: f32) -> Self {
        self.cell_gap_ratio = ratio;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        positive("heading_size_ratio", self.heading_size_ratio)?;
        positive("block_gap_multiplier", self.block_gap_multiplier)?;
        positive("line_tolerance", self.line_tolerance)?;
        positive("column_gap_ratio", self.column_gap_ratio)?;
        positive("cell_gap_ratio", self.cell_gap_ratio)?;
        positive("table_column_tolerance", self.table_column_tolerance)?;
        if let Some(unit) = self.list_indent_unit {
            positive("list_indent_unit", unit)?;
        }
        if !self.margin_band.is_finite() || self.margin_band < 0.0 {
            return Err(Error::invalid_option(
                "margin_band",
                format!("must be zero or positive, got {}", self.margin_band),
            ));
        }
        if self.heading_max_words == 0 {
            return Err(Error::invalid_option(
                "heading_max_words",
                "must be at least 1",
            ));
        }
        if self.min_table_rows < 1 {
            return Err(Error::invalid_option("min_table_rows", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            heading_size_ratio: DEFAULT_HEADING_SIZE_RATIO,
            heading_max_words: 20,
            block_gap_multiplier: DEFAULT_BLOCK_GAP_MULTIPLIER,
            min_table_rows: DEFAULT_MIN_TABLE_ROWS,
            list_indent_unit: None,
            margin_band: DEFAULT_MARGIN_BAND,
            line_tolerance: 0.6,
            column_gap_ratio: 1.0,
            cell_gap_ratio: 1.5,
            table_column_tolerance: 6.0,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_option(
            name,
            format!("must be a positive number, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_options_builder() {
        let options = LayoutOptions::new()
            .with_heading_size_ratio(1.5)
            .with_block_gap_multiplier(2.0)
            .with_min_table_rows(3)
            .with_list_indent_unit(12.0)
            .with_margin_band(0.0);

        assert_eq!(options.heading_size_ratio, 1.5);
        assert_eq!(options.block_gap_multiplier, 2.0);
        assert_eq!(options.min_table_rows, 3);
        assert_eq!(options.list_indent_unit, Some(12.0));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_default_options_are_valid() {
        let options = LayoutOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.min_table_rows, 2);
        assert!(options.list_indent_unit.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            LayoutOptions::new().with_block_gap_multiplier(0.0).validate(),
            Err(Error::InvalidOption {
                name: "block_gap_multiplier",
                ..
            })
        ));
        assert!(LayoutOptions::new()
            .with_list_indent_unit(-4.0)
            .validate()
            .is_err());
        assert!(LayoutOptions::new()
            .with_margin_band(f32::NAN)
            .validate()
            .is_err());
        assert!(LayoutOptions::new()
            .with_cell_gap_ratio(-1.0)
            .validate()
            .is_err());
    }
}
