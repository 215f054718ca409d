//! Reconstructed table grids.

use serde::{Deserialize, Serialize};

/// A table rebuilt from aligned rows.
///
/// The grid is rectangular: every row holds [`Table::column_count`] cells,
/// padded with empty text where a row had nothing in a column. The first
/// row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows top to bottom, header first
    pub rows: Vec<TableRow>,

    /// Left edge of each column in points, as clustered from cell starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_starts: Vec<f32>,
}

impl Table {
    /// Build a table from a grid of cell text, one inner vector per row.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let rows = grid
            .into_iter()
            .map(|cells| TableRow {
                cells: cells.into_iter().map(TableCell::text).collect(),
            })
            .collect();
        let table = Self {
            rows,
            column_starts: Vec::new(),
        };
        debug_assert!(table.is_rectangular(), "table grid must be rectangular");
        table
    }

    /// Attach the column positions the grid was aligned on.
    pub fn with_column_starts(mut self, starts: Vec<f32>) -> Self {
        self.column_starts = starts;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the grid, taken from the header row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.cells.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row is as wide as the header.
    pub fn is_rectangular(&self) -> bool {
        let width = self.column_count();
        self.rows.iter().all(|r| r.cells.len() == width)
    }

    pub fn header_row(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    /// Rows after the header.
    pub fn body_rows(&self) -> &[TableRow] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Text of one cell, `None` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(column))
            .map(|c| c.text.as_str())
    }

    /// Rows as tab-separated lines, used for word counts.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(TableRow::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One row of a table grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Non-empty cell texts joined by tabs.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell; padding cells have empty text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
}

impl TableCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
